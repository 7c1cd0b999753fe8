// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands

use whistle_meme::backends::camera::enumeration::enumerate_cameras;
use whistle_meme::backends::camera::select_device;

/// List all available cameras
pub fn list_cameras(preferred: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    let selected = select_device(&cameras, preferred);

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        let marker = if *camera == selected { "*" } else { " " };
        println!("{} [{}] {}", marker, index, camera.name);
        println!("      Target:   {}", camera.path);
        println!("      Rotation: {}", camera.rotation);
        println!(
            "      Location: {}",
            camera.location.as_deref().unwrap_or("unknown")
        );
        println!();
    }
    println!("* = camera opened by default");

    Ok(())
}
