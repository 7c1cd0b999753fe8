// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration
//!
//! Reads the node graph from `pw-dump` and keeps every `Video/Source` node.
//! libcamera exposes sensor rotation and location as node properties, which
//! is where the still capture learns how to turn its buffer upright.

use super::types::{CameraDevice, SensorRotation};
use std::process::Command;
use tracing::{debug, warn};

/// Enumerate cameras known to PipeWire
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    let output = match Command::new("pw-dump").output() {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "Failed to run pw-dump");
            return Vec::new();
        }
    };

    if !output.status.success() {
        warn!("pw-dump command failed");
        return Vec::new();
    }

    match std::str::from_utf8(&output.stdout) {
        Ok(stdout) => parse_pw_dump(stdout),
        Err(e) => {
            warn!(error = %e, "pw-dump output is not UTF-8");
            Vec::new()
        }
    }
}

/// Extract camera devices from `pw-dump` JSON
pub fn parse_pw_dump(json: &str) -> Vec<CameraDevice> {
    let nodes: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!(error = %e, "Failed to parse JSON from pw-dump");
            return Vec::new();
        }
    };

    let mut cameras = Vec::new();

    for node in &nodes {
        let Some(props) = node.get("info").and_then(|info| info.get("props")) else {
            continue;
        };

        if props.get("media.class").and_then(|v| v.as_str()) != Some("Video/Source") {
            continue;
        }

        let name = props
            .get("node.description")
            .or_else(|| props.get("node.nick"))
            .or_else(|| props.get("node.name"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Camera")
            .to_string();

        // object.serial is a number in newer PipeWire releases and a string in older ones
        let path = match props.get("object.serial") {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => String::new(),
        };

        let rotation = match props.get("api.libcamera.rotation") {
            Some(serde_json::Value::String(s)) => SensorRotation::from_degrees(s),
            Some(serde_json::Value::Number(n)) => n
                .as_i64()
                .and_then(|deg| i32::try_from(deg).ok())
                .map(SensorRotation::from_degrees_int)
                .unwrap_or_default(),
            _ => SensorRotation::None,
        };

        let location = props
            .get("api.libcamera.location")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        debug!(%name, %path, %rotation, ?location, "Found camera");

        cameras.push(CameraDevice {
            name,
            path,
            rotation,
            location,
        });
    }

    cameras
}

#[cfg(test)]
mod tests {
    use super::*;

    const PW_DUMP: &str = r#"[
        {
            "id": 30,
            "type": "PipeWire:Interface:Node",
            "info": { "props": {
                "media.class": "Audio/Source",
                "node.name": "alsa_input.pci",
                "object.serial": 31
            } }
        },
        {
            "id": 52,
            "type": "PipeWire:Interface:Node",
            "info": { "props": {
                "media.class": "Video/Source",
                "node.description": "Rear Camera",
                "object.serial": 58,
                "api.libcamera.rotation": "90",
                "api.libcamera.location": "back"
            } }
        },
        {
            "id": 53,
            "type": "PipeWire:Interface:Node",
            "info": { "props": {
                "media.class": "Video/Source",
                "node.name": "v4l2_input.usb",
                "object.serial": "61"
            } }
        },
        { "id": 0, "type": "PipeWire:Interface:Core", "info": null }
    ]"#;

    #[test]
    fn test_parse_video_sources_only() {
        let cameras = parse_pw_dump(PW_DUMP);
        assert_eq!(cameras.len(), 2);

        assert_eq!(cameras[0].name, "Rear Camera");
        assert_eq!(cameras[0].path, "58");
        assert_eq!(cameras[0].rotation, SensorRotation::Rotate90);
        assert!(cameras[0].is_back_facing());

        assert_eq!(cameras[1].name, "v4l2_input.usb");
        assert_eq!(cameras[1].path, "61");
        assert_eq!(cameras[1].rotation, SensorRotation::None);
        assert_eq!(cameras[1].location, None);
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert!(parse_pw_dump("not json").is_empty());
        assert!(parse_pw_dump("{}").is_empty());
    }

    #[test]
    fn test_numeric_rotation_out_of_range_is_ignored() {
        let dump = r#"[
            { "type": "PipeWire:Interface:Node", "info": { "props": {
                "media.class": "Video/Source",
                "object.serial": 70,
                "api.libcamera.rotation": 4294967386
            } } },
            { "type": "PipeWire:Interface:Node", "info": { "props": {
                "media.class": "Video/Source",
                "object.serial": 71,
                "api.libcamera.rotation": 270
            } } }
        ]"#;
        let cameras = parse_pw_dump(dump);
        assert_eq!(cameras[0].rotation, SensorRotation::None);
        assert_eq!(cameras[1].rotation, SensorRotation::Rotate270);
    }
}
