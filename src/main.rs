// Example runner: detect faces in an image file and optionally write an overlay.

use skin_face::core_modules::utils::image_helper::image_helper;
use skin_face::pipeline::FaceDetector;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: skin_face <input_image> [overlay_png]");
        return ExitCode::FAILURE;
    }

    match run(&args[1], args.get(2).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("skin_face: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input_path: &str, overlay_path: Option<&str>) -> skin_face::Result<()> {
    let mut image = image_helper::load_rgba(input_path)?;
    let faces = FaceDetector::default().detect_image(&image);

    if faces.is_empty() {
        println!("No faces");
    }
    for (index, face) in faces.iter().enumerate() {
        println!(
            "face {}: x={} y={} width={} height={} confidence={:.3}",
            index, face.x, face.y, face.width, face.height, face.confidence
        );
    }

    if let Some(path) = overlay_path {
        image_helper::draw_face_boxes(&mut image, &faces, image_helper::OUTLINE);
        image_helper::save(path, image.width(), image.height(), image.as_raw())?;
        println!("overlay written to {}", path);
    }

    Ok(())
}
