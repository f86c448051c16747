//! Type conversions between JSValue and V8 values.

use lessenv::JSValue;
use v8::{Array, Boolean, Local, Number, String as V8String, Value};

/// Collect V8 callback arguments into engine-agnostic `JSValue`s.
#[inline]
pub(crate) fn collect_js_args<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    args: &v8::FunctionCallbackArguments,
) -> Vec<JSValue> {
    let length = args.length();
    let start: i32 = 0;
    (start..length)
        .map(|index| local_to_jsvalue(scope, args.get(index)))
        .collect()
}

/// Convert a V8 value into a `JSValue`. Objects and functions are reduced to
/// their string form; arrays are converted element by element.
pub(crate) fn local_to_jsvalue<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    value: Local<'_, Value>,
) -> JSValue {
    if value.is_undefined() {
        return JSValue::Undefined;
    }
    if value.is_null() {
        return JSValue::Null;
    }
    if value.is_boolean() {
        return JSValue::Boolean(value.boolean_value(scope));
    }
    if value.is_number() {
        return JSValue::Number(value.number_value(scope).unwrap_or(f64::NAN));
    }
    if value.is_string() {
        return JSValue::String(
            value
                .to_string(scope)
                .map_or_else(String::new, |val_str| val_str.to_rust_string_lossy(scope)),
        );
    }
    if let Ok(array) = Local::<Array>::try_from(value) {
        let mut elements = Vec::with_capacity(array.length() as usize);
        for index in 0..array.length() {
            let element = array
                .get_index(scope, index)
                .map_or(JSValue::Undefined, |item| local_to_jsvalue(scope, item));
            elements.push(element);
        }
        return JSValue::Array(elements);
    }
    JSValue::String(value.to_string(scope).map_or_else(
        || String::from("undefined"),
        |val_str| val_str.to_rust_string_lossy(scope),
    ))
}

#[inline]
/// Convert a `JSValue` into a V8 `Local<Value>`.
///
/// # Arguments
///
/// * `scope`: The V8 handle scope.
/// * `value`: The `JSValue` to convert.
///
/// # Returns
/// The converted `Local<Value>`.
pub(crate) fn jsvalue_to_local<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    value: JSValue,
) -> Local<'s, Value> {
    match value {
        JSValue::Undefined => v8::undefined(scope).into(),
        JSValue::Null => v8::null(scope).into(),
        JSValue::Boolean(boolean_value) => Boolean::new(scope, boolean_value).into(),
        JSValue::Number(number_value) => Number::new(scope, number_value).into(),
        JSValue::String(string_value) => V8String::new(scope, string_value.as_str())
            .map_or_else(|| v8::undefined(scope).into(), Into::into),
        JSValue::Array(values) => {
            let elements: Vec<Local<'s, Value>> = values
                .into_iter()
                .map(|item| jsvalue_to_local(scope, item))
                .collect();
            Array::new_with_elements(scope, &elements).into()
        }
    }
}

/// Quote `key` as a JavaScript string literal, suitable for `obj[key]` access.
#[inline]
pub(crate) fn quote_js_key(key: &str) -> String {
    // JSON string literals are valid JavaScript string literals.
    serde_json::Value::String(key.to_owned()).to_string()
}

/// Render a `JSValue` as JavaScript source that evaluates to an equal value.
pub(crate) fn js_literal(value: &JSValue) -> String {
    match value {
        JSValue::Undefined => String::from("undefined"),
        JSValue::Null => String::from("null"),
        JSValue::Boolean(boolean_value) => boolean_value.to_string(),
        JSValue::Number(number_value) if number_value.is_nan() => String::from("NaN"),
        JSValue::Number(number_value) if number_value.is_infinite() => {
            if number_value.is_sign_positive() {
                String::from("Infinity")
            } else {
                String::from("-Infinity")
            }
        }
        JSValue::Number(number_value) => serde_json::Number::from_f64(*number_value)
            .map_or_else(|| String::from("NaN"), |number| number.to_string()),
        JSValue::String(string_value) => quote_js_key(string_value),
        JSValue::Array(values) => {
            let elements: Vec<String> = values.iter().map(js_literal).collect();
            format!("[{}]", elements.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_round_trip_through_js_syntax() {
        assert_eq!(js_literal(&JSValue::Undefined), "undefined");
        assert_eq!(js_literal(&JSValue::Number(f64::NAN)), "NaN");
        assert_eq!(js_literal(&JSValue::Number(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(js_literal(&JSValue::Number(1.5)), "1.5");
        assert_eq!(
            js_literal(&JSValue::Array(vec![
                JSValue::String("a\nb".into()),
                JSValue::Boolean(true),
                JSValue::Null,
            ])),
            "[\"a\\nb\",true,null]"
        );
    }

    #[test]
    fn keys_are_quoted_as_literals() {
        assert_eq!(quote_js_key("encoder.js"), "\"encoder.js\"");
        assert_eq!(quote_js_key("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }
}
