//! Pixel-level properties of the export pipeline, checked against
//! synthesized PNG sources so no external fixtures are needed.

use admix::{
    AdmixError, AssetStore, CanvasSize, FontLibrary, Layer, LayerContent, RenderConfig,
    Rasterizer, TextStyle,
};

mod common;
use common::{campaign, data_uri, pixel, png_bytes};

fn rasterizer(size: u32) -> Rasterizer {
    common::init_tracing();
    let config = RenderConfig::with_output(CanvasSize::new(size).unwrap());
    Rasterizer::new(config, FontLibrary::new())
}

fn rasterizer_no_image_shadow(size: u32) -> Rasterizer {
    let mut config = RenderConfig::with_output(CanvasSize::new(size).unwrap());
    config.image_shadow_enabled = false;
    Rasterizer::new(config, FontLibrary::new())
}

fn sticker(id: &str, src: String, z: i32) -> Layer {
    Layer {
        id: id.to_string(),
        content: LayerContent::Sticker { src },
        visible: true,
        locked: false,
        x: 50.0,
        y: 50.0,
        rotation: 0.0,
        scale: 1.0,
        z_index: z,
        opacity: 1.0,
    }
}

#[test]
fn wide_background_letterboxes_vertically() {
    let bg = data_uri(&png_bytes(128, 64, [255, 0, 0, 255]));
    let mut r = rasterizer(64);
    let mut assets = AssetStore::new(".");
    let frame = r.render(&campaign(bg, vec![]), &mut assets).unwrap();

    // 2:1 source into a 64 square: drawn height 32, top offset 16.
    assert_eq!(pixel(&frame, 32, 8), [0, 0, 0, 0]);
    assert_eq!(pixel(&frame, 32, 56), [0, 0, 0, 0]);
    assert_eq!(pixel(&frame, 32, 32), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 2, 32), [255, 0, 0, 255]);
}

#[test]
fn tall_background_letterboxes_horizontally() {
    let bg = data_uri(&png_bytes(64, 128, [0, 255, 0, 255]));
    let mut r = rasterizer(64);
    let mut assets = AssetStore::new(".");
    let frame = r.render(&campaign(bg, vec![]), &mut assets).unwrap();

    assert_eq!(pixel(&frame, 8, 32), [0, 0, 0, 0]);
    assert_eq!(pixel(&frame, 56, 32), [0, 0, 0, 0]);
    assert_eq!(pixel(&frame, 32, 32), [0, 255, 0, 255]);
}

#[test]
fn higher_z_index_draws_on_top() {
    let bg = data_uri(&png_bytes(32, 32, [255, 255, 255, 255]));
    let red = data_uri(&png_bytes(10, 10, [255, 0, 0, 255]));
    let blue = data_uri(&png_bytes(10, 10, [0, 0, 255, 255]));
    let layers = vec![sticker("red", red, 1), sticker("blue", blue, 2)];

    let mut r = rasterizer_no_image_shadow(256);
    let mut assets = AssetStore::new(".");
    let snapshot = campaign(bg, layers);
    let frame = r.render(&snapshot, &mut assets).unwrap();
    assert_eq!(pixel(&frame, 128, 128), [0, 0, 255, 255]);

    // Swap the stacking order through the stack manager and re-render.
    let mut stack = admix::LayerStack::from_layers(snapshot.layers.clone());
    stack
        .reorder(&["blue".to_string(), "red".to_string()])
        .unwrap();
    let mut snapshot = snapshot;
    snapshot.layers = stack.into_layers();
    let frame = r.render(&snapshot, &mut assets).unwrap();
    assert_eq!(pixel(&frame, 128, 128), [255, 0, 0, 255]);
}

#[test]
fn equal_z_resolves_by_insertion_order() {
    let bg = data_uri(&png_bytes(32, 32, [255, 255, 255, 255]));
    let red = data_uri(&png_bytes(10, 10, [255, 0, 0, 255]));
    let blue = data_uri(&png_bytes(10, 10, [0, 0, 255, 255]));
    let layers = vec![sticker("red", red, 5), sticker("blue", blue, 5)];

    let mut r = rasterizer_no_image_shadow(256);
    let mut assets = AssetStore::new(".");
    let frame = r.render(&campaign(bg, layers), &mut assets).unwrap();
    assert_eq!(pixel(&frame, 128, 128), [0, 0, 255, 255]);
}

#[test]
fn invisible_layers_are_skipped_entirely() {
    let bg = data_uri(&png_bytes(32, 32, [255, 255, 255, 255]));
    let red = data_uri(&png_bytes(10, 10, [255, 0, 0, 255]));
    let mut hidden = sticker("red", red, 1);
    hidden.visible = false;

    let mut r = rasterizer_no_image_shadow(256);
    let mut assets = AssetStore::new(".");
    let frame = r.render(&campaign(bg, vec![hidden]), &mut assets).unwrap();
    assert_eq!(pixel(&frame, 128, 128), [255, 255, 255, 255]);
}

#[test]
fn half_opacity_halves_layer_alpha() {
    // Transparent background keeps the arithmetic exact: the sticker pixel
    // lands on nothing, so the output alpha is the layer opacity.
    let bg = data_uri(&png_bytes(32, 32, [0, 0, 0, 0]));
    let blue = data_uri(&png_bytes(10, 10, [0, 0, 255, 255]));
    let mut layer = sticker("blue", blue, 1);
    layer.opacity = 0.5;

    let mut r = rasterizer_no_image_shadow(256);
    let mut assets = AssetStore::new(".");
    let frame = r.render(&campaign(bg, vec![layer]), &mut assets).unwrap();
    let [_, _, b, a] = pixel(&frame, 128, 128);
    assert!((120..=136).contains(&a), "alpha {a}");
    assert!((120..=136).contains(&b), "blue {b}");
}

#[test]
fn shadow_off_leaves_no_pixels_outside_content() {
    let bg = data_uri(&png_bytes(32, 32, [0, 0, 0, 0]));
    let blue = data_uri(&png_bytes(10, 10, [0, 0, 255, 255]));

    // At a 256 output the unscaled sticker is 75px wide, centered: content
    // spans roughly x in [90, 166]. Probe just outside that edge, inside
    // the ~4px shadow reach.
    let probe = (168u32, 128u32);

    let mut assets = AssetStore::new(".");
    let mut with_shadow = rasterizer(256);
    let frame = with_shadow
        .render(&campaign(bg.clone(), vec![sticker("b", blue.clone(), 1)]), &mut assets)
        .unwrap();
    assert!(pixel(&frame, probe.0, probe.1)[3] > 0, "expected shadow reach");

    let mut without = rasterizer_no_image_shadow(256);
    let frame = without
        .render(&campaign(bg, vec![sticker("b", blue, 1)]), &mut assets)
        .unwrap();
    assert_eq!(pixel(&frame, probe.0, probe.1), [0, 0, 0, 0]);
}

#[test]
fn degenerate_scale_renders_nothing_but_does_not_fail() {
    let bg = data_uri(&png_bytes(32, 32, [255, 255, 255, 255]));
    let red = data_uri(&png_bytes(10, 10, [255, 0, 0, 255]));
    let mut tiny = sticker("red", red, 1);
    tiny.scale = 0.0;

    let mut r = rasterizer_no_image_shadow(256);
    let mut assets = AssetStore::new(".");
    let frame = r.render(&campaign(bg, vec![tiny]), &mut assets).unwrap();
    assert_eq!(pixel(&frame, 128, 128), [255, 255, 255, 255]);
}

#[test]
fn off_canvas_layers_render_without_error() {
    let bg = data_uri(&png_bytes(32, 32, [255, 255, 255, 255]));
    let red = data_uri(&png_bytes(10, 10, [255, 0, 0, 255]));
    let mut gone = sticker("red", red, 1);
    gone.x = -50.0;
    gone.y = 150.0;
    gone.rotation = 720.0 + 45.0;

    let mut r = rasterizer_no_image_shadow(256);
    let mut assets = AssetStore::new(".");
    let frame = r.render(&campaign(bg, vec![gone]), &mut assets).unwrap();
    assert_eq!(pixel(&frame, 128, 128), [255, 255, 255, 255]);
}

#[test]
fn missing_background_aborts_export() {
    let mut r = rasterizer(64);
    let mut assets = AssetStore::new("/nonexistent-root");
    let err = r
        .render(&campaign("missing-bg.png", vec![]), &mut assets)
        .unwrap_err();
    assert!(matches!(err, AdmixError::Asset(_)));
}

#[test]
fn missing_layer_source_aborts_export() {
    let bg = data_uri(&png_bytes(32, 32, [255, 255, 255, 255]));
    let mut r = rasterizer(64);
    let mut assets = AssetStore::new("/nonexistent-root");
    let err = r
        .render(
            &campaign(bg, vec![sticker("s", "missing-layer.png".to_string(), 1)]),
            &mut assets,
        )
        .unwrap_err();
    assert!(matches!(err, AdmixError::Asset(_)));
}

#[test]
fn unregistered_font_family_aborts_export() {
    let bg = data_uri(&png_bytes(32, 32, [255, 255, 255, 255]));
    let text = Layer {
        id: "t".to_string(),
        content: LayerContent::Text {
            text: "HELLO".to_string(),
            style: TextStyle::seed("NoSuchFamily", "#ffffff"),
        },
        visible: true,
        locked: false,
        x: 50.0,
        y: 50.0,
        rotation: 0.0,
        scale: 1.0,
        z_index: 1,
        opacity: 1.0,
    };

    let mut r = rasterizer(64);
    let mut assets = AssetStore::new(".");
    let err = r.render(&campaign(bg, vec![text]), &mut assets).unwrap_err();
    assert!(matches!(err, AdmixError::Asset(_)));
}

#[test]
fn render_is_deterministic() {
    let bg = data_uri(&png_bytes(48, 24, [30, 60, 90, 255]));
    let red = data_uri(&png_bytes(10, 10, [255, 0, 0, 255]));
    let mut layer = sticker("red", red, 1);
    layer.rotation = 30.0;
    layer.scale = 0.7;
    layer.opacity = 0.8;
    let snapshot = campaign(bg, vec![layer]);

    let mut r = rasterizer(128);
    let mut assets = AssetStore::new(".");
    let a = r.render(&snapshot, &mut assets).unwrap();
    let b = r.render(&snapshot, &mut assets).unwrap();
    assert_eq!(a.data, b.data);

    // A fresh rasterizer and store produce the same bytes again.
    let mut r2 = rasterizer(128);
    let mut assets2 = AssetStore::new(".");
    let c = r2.render(&snapshot, &mut assets2).unwrap();
    assert_eq!(a.data, c.data);
}

#[test]
fn exported_png_decodes_to_the_rendered_frame() {
    let bg = data_uri(&png_bytes(16, 16, [12, 34, 56, 255]));
    let snapshot = campaign(bg, vec![]);
    let mut r = rasterizer(64);
    let mut assets = AssetStore::new(".");
    let png = admix::export_png(&mut r, &snapshot, &mut assets).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (64, 64));
    assert_eq!(decoded.get_pixel(32, 32).0, [12, 34, 56, 255]);
}
