use super::*;

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = gaussian_blur_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 40u8];
    let src = px.repeat((w * h) as usize);
    let out = gaussian_blur_premul(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn single_pixel_energy_spreads_but_is_conserved() {
    let (w, h) = (7u32, 7u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((3 * w + 3) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = gaussian_blur_premul(&src, w, h, 2, 1.2).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 6);
}

#[test]
fn mismatched_buffer_is_rejected() {
    assert!(gaussian_blur_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
    assert!(gaussian_blur_premul(&[0u8; 8], 1, 2, 1, 0.0).is_err());
}

#[test]
fn css_radius_covers_three_sigma() {
    assert_eq!(css_blur_params(120.0), (360, 120.0));
    assert_eq!(css_blur_params(0.0).0, 0);
}
