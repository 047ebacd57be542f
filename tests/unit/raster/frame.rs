use super::*;

fn gradient_gray(w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| image::Luma([(x + y * w) as u8]))
}

#[test]
fn from_dynamic_maps_layouts_to_modes() {
    let g = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
    assert_eq!(ImageFrame::from_dynamic(g).mode(), ColorMode::Grayscale);

    let c = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
    assert_eq!(ImageFrame::from_dynamic(c).mode(), ColorMode::Rgb);

    let g16 = DynamicImage::ImageLuma16(image::ImageBuffer::new(2, 2));
    assert_eq!(ImageFrame::from_dynamic(g16).mode(), ColorMode::Native);

    let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(3, 1));
    let f = ImageFrame::from_dynamic(rgba);
    assert_eq!(f.mode(), ColorMode::Native);
    assert_eq!((f.width(), f.height()), (3, 1));
}

#[test]
fn native_frames_normalize_to_drawing_modes() {
    let g16 = image::ImageBuffer::from_pixel(2, 2, image::Luma([0xffffu16]));
    let n = ImageFrame::from_dynamic(DynamicImage::ImageLuma16(g16)).normalize();
    assert_eq!(n.mode(), ColorMode::Grayscale);
    assert_eq!(n.pixel_luma(1, 1), Some(255));

    let rgba = image::RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 40]));
    let n = ImageFrame::from_dynamic(DynamicImage::ImageRgba8(rgba)).normalize();
    assert_eq!(n.mode(), ColorMode::Rgb);
    assert_eq!(n.pixel_rgb(0, 0), Some([10, 20, 30]));
}

#[test]
fn native_crop_and_save_keep_depth_and_alpha() {
    let dir = tempfile::tempdir().unwrap();

    let g16: image::ImageBuffer<image::Luma<u16>, Vec<u16>> =
        image::ImageBuffer::from_fn(8, 8, |x, y| image::Luma([(x * 1000 + y) as u16]));
    let f = ImageFrame::from_dynamic(DynamicImage::ImageLuma16(g16));
    let b = CropBox {
        left: 2,
        top: 1,
        right: 6,
        bottom: 4,
    };
    let path = dir.path().join("g16.png");
    f.crop(b).unwrap().save(&path).unwrap();
    let back = image::open(&path).unwrap();
    assert_eq!(back.color(), image::ColorType::L16);
    assert_eq!((back.width(), back.height()), (4, 3));
    assert_eq!(back.as_luma16().unwrap().get_pixel(0, 0).0, [2001]);

    let rgba = image::RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 77]));
    let f = ImageFrame::from_dynamic(DynamicImage::ImageRgba8(rgba));
    let path = dir.path().join("rgba.png");
    f.crop(b).unwrap().save(&path).unwrap();
    let back = image::open(&path).unwrap();
    assert_eq!(back.color(), image::ColorType::Rgba8);
    assert_eq!(back.as_rgba8().unwrap().get_pixel(0, 0).0, [1, 2, 3, 77]);
}

#[test]
fn palette_normalizes_to_rgb() {
    let indices = GrayImage::from_raw(2, 1, vec![0, 1]).unwrap();
    let f = ImageFrame::palette(indices, vec![[0, 0, 0], [255, 0, 0]]).unwrap();
    assert_eq!(f.mode(), ColorMode::Palette);
    assert_eq!(f.pixel_rgb(1, 0), Some([255, 0, 0]));

    let n = f.normalize();
    assert_eq!(n.mode(), ColorMode::Rgb);
    assert_eq!(n.pixel_rgb(0, 0), Some([0, 0, 0]));
    assert_eq!(n.pixel_rgb(1, 0), Some([255, 0, 0]));
}

#[test]
fn palette_rejects_dangling_index() {
    let indices = GrayImage::from_raw(1, 1, vec![3]).unwrap();
    let err = ImageFrame::palette(indices, vec![[0, 0, 0]]).unwrap_err();
    assert!(matches!(err, TrackovlError::Validation(_)));
}

#[test]
fn normalize_keeps_gray_and_rgb() {
    let g = ImageFrame::gray(gradient_gray(3, 3));
    assert_eq!(g.clone().normalize(), g);
    let c = ImageFrame::rgb(RgbImage::new(2, 2));
    assert_eq!(c.clone().normalize(), c);
}

#[test]
fn crop_copies_region() {
    let f = ImageFrame::gray(gradient_gray(10, 10));
    let b = CropBox {
        left: 2,
        top: 3,
        right: 5,
        bottom: 4,
    };
    let c = f.crop(b).unwrap();
    assert_eq!((c.width(), c.height()), (3, 1));
    assert_eq!(c.pixel_luma(0, 0), Some(32));
    assert_eq!(c.pixel_luma(2, 0), Some(34));
}

#[test]
fn crop_outside_frame_is_rejected() {
    let f = ImageFrame::gray(gradient_gray(10, 10));
    let b = CropBox {
        left: 5,
        top: 0,
        right: 11,
        bottom: 2,
    };
    assert!(matches!(f.crop(b), Err(TrackovlError::OutOfBounds(_))));
}

#[test]
fn save_then_open_keeps_mode_and_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("f_T0001.png");

    let f = ImageFrame::gray(gradient_gray(4, 4));
    f.save(&path).unwrap();
    let back = ImageFrame::open(&path).unwrap();
    assert_eq!(back, f);

    let indices = GrayImage::from_raw(1, 1, vec![1]).unwrap();
    let p = ImageFrame::palette(indices, vec![[0, 0, 0], [10, 20, 30]]).unwrap();
    let ppath = dir.path().join("p.png");
    p.save(&ppath).unwrap();
    let back = ImageFrame::open(&ppath).unwrap();
    assert_eq!(back.mode(), ColorMode::Rgb);
    assert_eq!(back.pixel_rgb(0, 0), Some([10, 20, 30]));
}

#[test]
fn open_missing_file_is_recoverable() {
    let err = ImageFrame::open(Path::new("definitely/not/here.png")).unwrap_err();
    assert!(err.is_recoverable());
}
