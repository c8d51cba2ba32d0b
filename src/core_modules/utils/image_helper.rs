// Debug helpers for looking at detections: load a frame from disk, paint the
// detected boxes onto it and write the result back out as PNG.

pub mod image_helper {
    use crate::core_modules::region::FaceBox;
    use crate::error::Result;
    use image::{ImageEncoder, Rgba, RgbaImage};
    use std::path::Path;

    pub const OUTLINE: Rgba<u8> = Rgba([0, 255, 0, 255]);

    /// Decodes any format `image` understands into an RGBA frame.
    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        Ok(image::open(path)?.to_rgba8())
    }

    /// Writes a raw RGBA buffer as PNG.
    pub fn save<P: AsRef<Path>>(path: P, width: u32, height: u32, buffer: &[u8]) -> Result<()> {
        let output = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

        Ok(())
    }

    /// Paints a one-pixel outline for every face. Edges outside the image are clipped.
    pub fn draw_face_boxes(image: &mut RgbaImage, faces: &[FaceBox], color: Rgba<u8>) {
        let (width, height) = image.dimensions();
        for face in faces {
            if face.width == 0 || face.height == 0 || face.x >= width || face.y >= height {
                continue;
            }
            let right = face.right().min(width) - 1;
            let bottom = face.bottom().min(height) - 1;

            for x in face.x..=right {
                image.put_pixel(x, face.y, color);
                image.put_pixel(x, bottom, color);
            }
            for y in face.y..=bottom {
                image.put_pixel(face.x, y, color);
                image.put_pixel(right, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::region::FaceBox;
    use image::{Rgba, RgbaImage};

    fn face(x: u32, y: u32, width: u32, height: u32) -> FaceBox {
        FaceBox {
            x,
            y,
            width,
            height,
            confidence: 1.0,
        }
    }

    #[test]
    fn outline_is_drawn_on_the_box_edges() {
        let mut image = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        draw_face_boxes(&mut image, &[face(2, 3, 5, 4)], OUTLINE);

        assert_eq!(*image.get_pixel(2, 3), OUTLINE);
        assert_eq!(*image.get_pixel(6, 6), OUTLINE);
        assert_eq!(*image.get_pixel(4, 3), OUTLINE);
        assert_eq!(*image.get_pixel(4, 5), Rgba([0, 0, 0, 255]));
        assert_eq!(*image.get_pixel(7, 3), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn boxes_past_the_edge_are_clipped() {
        let mut image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        draw_face_boxes(&mut image, &[face(5, 5, 50, 50), face(40, 40, 5, 5)], OUTLINE);

        assert_eq!(*image.get_pixel(9, 9), OUTLINE);
        assert_eq!(*image.get_pixel(5, 9), OUTLINE);
    }

    #[test]
    fn saved_png_loads_back() {
        let width = 12u32;
        let height = 7u32;
        let buffer: Vec<u8> = [200u8, 150, 120, 255]
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        let path = std::env::temp_dir().join(format!("skin_face_save_{}.png", std::process::id()));

        save(&path, width, height, &buffer).expect("Error Saving File.");
        let loaded = load_rgba(&path).expect("Error Loading File.");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.dimensions(), (width, height));
        assert_eq!(loaded.as_raw(), &buffer);
    }
}
