//! Date/time functions (spec §4.9 "Date/time").
//!
//! `$now`/`$millis` read the per-call timestamp off [`Frame::global`] so
//! every invocation within one `evaluate()` call observes the same
//! instant (spec §5 shared-resource policy); `$rightNow` reads the wall
//! clock directly.

use super::{async_fn, sync_fn};
use crate::value::{Frame, Value};
use chrono::{DateTime, SecondsFormat, Utc};

pub(super) fn register(frame: &Frame) {
    frame.bind("now", async_fn("now", Some("s?s?"), |ctx, args| {
        Box::pin(async move {
            let millis = ctx.frame.global.timestamp_millis;
            Ok(Value::String(format_millis(millis, &picture_arg(args))))
        })
    }));
    frame.bind("millis", async_fn("millis", None, |ctx, _args| {
        Box::pin(async move { Ok(Value::Number(ctx.frame.global.timestamp_millis as f64)) })
    }));
    frame.bind("rightNow", sync_fn("rightNow", Some("s?s?"), |_, args| {
        let millis = Utc::now().timestamp_millis();
        Ok(Value::String(format_millis(millis, &picture_arg(args))))
    }));
    frame.bind("toMillis", sync_fn("toMillis", Some("-ss?"), |input, mut args| {
        args.pop();
        let text = match if args.is_empty() { input } else { args.remove(0) } {
            Value::String(s) => s,
            _ => return Ok(Value::Undefined),
        };
        Ok(parse_to_millis(&text).map(|m| Value::Number(m as f64)).unwrap_or(Value::Undefined))
    }));
    frame.bind("fromMillis", sync_fn("fromMillis", Some("-ns?s?"), |input, mut args| {
        let timezone = args.pop();
        let picture = match args.pop() {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let _ = timezone;
        let millis = match if args.is_empty() { input } else { args.remove(0) } {
            Value::Number(n) => n as i64,
            _ => return Ok(Value::Undefined),
        };
        Ok(Value::String(format_millis(millis, &picture.unwrap_or_default())))
    }));
    frame.bind("formatInteger", sync_fn("formatInteger", Some("-ns"), |input, mut args| {
        let picture = match args.pop() {
            Some(Value::String(s)) => s,
            _ => return Ok(Value::Undefined),
        };
        let n = match if args.is_empty() { input } else { args.remove(0) } {
            Value::Number(n) => n as i64,
            _ => return Ok(Value::Undefined),
        };
        Ok(Value::String(format_integer_picture(n, &picture)))
    }));
    frame.bind("parseInteger", sync_fn("parseInteger", Some("-ss"), |input, mut args| {
        let picture = args.pop();
        let _ = picture;
        let text = match if args.is_empty() { input } else { args.remove(0) } {
            Value::String(s) => s,
            _ => return Ok(Value::Undefined),
        };
        let digits: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
        Ok(digits.parse::<i64>().map(|n| Value::Number(n as f64)).unwrap_or(Value::Undefined))
    }));
    frame.bind("wait", async_fn("wait", Some("n"), |_ctx, args| {
        Box::pin(async move {
            let millis = match args.into_iter().next() {
                Some(Value::Number(n)) if n > 0.0 => n as u64,
                _ => 0,
            };
            if millis > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
            }
            Ok(Value::Undefined)
        })
    }));
}

fn picture_arg(mut args: Vec<Value>) -> String {
    args.drain(..).find_map(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    }).unwrap_or_default()
}

fn format_millis(millis: i64, picture: &str) -> String {
    let dt = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(|| Utc::now());
    if picture.is_empty() {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    } else {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn parse_to_millis(text: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.timestamp_millis())
}

fn format_integer_picture(n: i64, picture: &str) -> String {
    let width = picture.chars().filter(|c| *c == '0' || *c == '9' || *c == '#').count().max(1);
    if picture.contains('0') {
        format!("{n:0width$}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_integer_pads_zero_picture() {
        assert_eq!(format_integer_picture(7, "00"), "07");
    }

    #[test]
    fn round_trips_rfc3339_millis() {
        let millis = 1_700_000_000_123;
        let text = format_millis(millis, "");
        assert_eq!(parse_to_millis(&text), Some(millis));
    }
}
