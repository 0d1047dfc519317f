//! Map calibration data and the notification sent to clients.

use serde::Serialize;
use serde_json::{Map, Value};

/// The active map as clients see it: its name plus display calibration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapInfo {
    pub name: String,
    #[serde(flatten)]
    pub calibration: Map<String, Value>,
}

#[derive(Serialize)]
struct MapNotification<'a> {
    command: &'static str,
    map: &'a MapInfo,
}

impl MapInfo {
    /// Map `name` with its overview calibration.
    pub fn new(name: &str, calibration: Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            calibration,
        }
    }

    /// `{"command":"map","map":{"name":...,"pos_x":...,...}}`
    pub fn notification(&self) -> serde_json::Result<String> {
        serde_json::to_string(&MapNotification {
            command: "map",
            map: self,
        })
    }
}

/// Keeps the `pos_*` and `scale` entries of an overview resource file.
///
/// Lines look like `"pos_x"  "-2476"`; quotes are dropped and the first two
/// whitespace-separated words become key and value. Values stay strings.
pub fn parse_calibration(text: &str) -> Map<String, Value> {
    text.lines()
        .filter(|line| line.contains("pos_") || line.contains("scale"))
        .filter_map(|line| {
            let cleaned = line.trim().replace('"', "");
            let mut words = cleaned.split_whitespace();
            let key = words.next()?;
            let value = words.next()?;
            Some((key.to_string(), Value::String(value.to_string())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DUST2: &str = r#"// DUST2
"de_dust2"
{
	"material"	"overviews/de_dust2"
	"pos_x"		"-2476"
	"pos_y"		"3239"
	"scale"		"4.4"
	"rotate"	"1"
	"zoom"		"1.1"
}
"#;

    #[test]
    fn test_parse_calibration() {
        let calibration = parse_calibration(DUST2);
        assert_eq!(
            Value::Object(calibration),
            json!({ "pos_x": "-2476", "pos_y": "3239", "scale": "4.4" })
        );
    }

    #[test]
    fn test_parse_calibration_skips_keys_without_values() {
        let calibration = parse_calibration("\"scale\"\n\"pos_x\" \"1\"\r\n");
        assert_eq!(Value::Object(calibration), json!({ "pos_x": "1" }));
    }

    #[test]
    fn test_notification_shape() {
        let info = MapInfo::new("de_dust2", parse_calibration(DUST2));
        let payload: Value = serde_json::from_str(&info.notification().unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "command": "map",
                "map": { "name": "de_dust2", "pos_x": "-2476", "pos_y": "3239", "scale": "4.4" }
            })
        );
    }

    #[test]
    fn test_notification_without_calibration() {
        let info = MapInfo::new("cs_office", Map::new());
        assert_eq!(
            info.notification().unwrap(),
            r#"{"command":"map","map":{"name":"cs_office"}}"#
        );
    }
}
