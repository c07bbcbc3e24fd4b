use super::*;
use crate::common::error::ErrorKind;
use crate::fixtures::{LayerBuilder, PsdBuilder};
use crate::header::ColorMode;
use crate::layer::blend::Blend;
use crate::resources::descriptor::tests::DescriptorWriter;
use crate::resources::ids;
use crate::resources::layer_comps::tests::comps_payload;
use proptest::prelude::*;
use std::io::Write;

/// 900x600 RGB document: a group of comp folders over two plain layers.
///
/// Top-to-bottom:
///
/// ```text
/// Versions
///     Version C (hidden)      Title C
///     Version B (hidden)      Title B
///     Version A               Logo_Glyph, Title A, Background A
/// Matte
/// Background
/// ```
fn versions_document() -> PsdBuilder {
    let logo = LayerBuilder::new("Logo")
        .unicode_name("Logo_Glyph")
        .rect(210, 379, 389, 521)
        .channel(-1, &[0, 0, 0xFF])
        .channel(0, &[0, 0, 0x10])
        .channel(1, &[0, 0, 0x20])
        .channel(2, &[0, 0, 0x30])
        .info(b"lyid", &42u32.to_be_bytes())
        .info(b"lclr", &[0, 2, 0, 0, 0, 0, 0, 0]);

    PsdBuilder::new(900, 600)
        .resource(ids::LAYER_COMPS, "", &comps_payload(&["Version A", "Version B", "Version C"], Some(100)))
        .resource(ids::RESOLUTION_INFO, "", &[0; 16])
        .layer(LayerBuilder::new("Background").rect(0, 0, 600, 900))
        .layer(LayerBuilder::new("Matte").rect(0, 0, 600, 900).blend(b"mul ").opacity(128))
        .layer(LayerBuilder::folder_end())
        .layer(LayerBuilder::folder_end())
        .layer(LayerBuilder::new("Background A").rect(0, 0, 600, 900))
        .layer(LayerBuilder::new("Title A").rect(40, 40, 90, 500))
        .layer(logo)
        .layer(LayerBuilder::folder("Version A"))
        .layer(LayerBuilder::folder_end())
        .layer(LayerBuilder::new("Title B"))
        .layer(LayerBuilder::folder("Version B").hidden())
        .layer(LayerBuilder::folder_end())
        .layer(LayerBuilder::new("Title C"))
        .layer(LayerBuilder::folder("Version C").hidden())
        .layer(LayerBuilder::folder("Versions"))
}

fn names<'a>(layers: impl Iterator<Item = &'a Layer>) -> Vec<&'a str> {
    layers.map(Layer::name).collect()
}

#[test]
fn test_header() {
    let doc = parse(&versions_document().build()).unwrap();
    let header = doc.header();
    assert_eq!(header.width, 900);
    assert_eq!(header.height, 600);
    assert_eq!(header.channels, 3);
    assert_eq!(header.depth, 8);
    assert_eq!(header.color_mode, ColorMode::Rgb);
    assert_eq!(header.color_mode.raw(), 3);
    assert_eq!(header.color_mode.name(), "RGBColor");
}

#[test]
fn test_single_layer_document() {
    let raw = PsdBuilder::new(4, 4)
        .layer(LayerBuilder::new("Layer 1").rect(0, 0, 4, 4))
        .build();
    let doc = parse(&raw).unwrap();

    assert_eq!(names(doc.roots()), vec!["Layer 1"]);
    assert_eq!(names(doc.layers()), vec!["Layer 1"]);
    let layer = doc.roots().next().unwrap();
    assert!(!layer.is_folder());
    assert!(layer.parent().is_none());
    assert!(layer.children().is_empty());
    assert!(!doc.had_unbalanced_folders());
}

#[test]
fn test_layer_list() {
    let doc = parse(&versions_document().build()).unwrap();
    assert_eq!(doc.layer_count(), 15);
    assert_eq!(doc.layers().len(), 15);
    assert!(!doc.merged_alpha());
    assert!(!doc.had_unbalanced_folders());

    let first = doc.layers().next().unwrap();
    assert_eq!(first.name(), "Versions");
    assert!(first.is_folder());
    assert!(first.visible());

    let second = doc.layers().nth(1).unwrap();
    assert_eq!(second.name(), "Version C");
    assert!(!second.visible());

    let last = doc.layers().last().unwrap();
    assert_eq!(last.name(), "Background");
}

#[test]
fn test_hierarchy() {
    let doc = parse(&versions_document().build()).unwrap();
    assert_eq!(names(doc.roots()), vec!["Versions", "Matte", "Background"]);

    let versions = doc.find_layer("Versions").unwrap();
    let children: Vec<&Layer> = doc.children(versions.id()).collect();
    assert_eq!(names(children.iter().copied()), vec!["Version C", "Version B", "Version A"]);
    assert!(children.iter().any(|layer| !layer.visible()));
    assert!(children.iter().any(|layer| layer.visible() && layer.name() == "Version A"));

    let version_a = doc.find_layer("Version A").unwrap();
    assert_eq!(
        names(doc.children(version_a.id())),
        vec!["Logo_Glyph", "Title A", "Background A"]
    );

    let logo = doc.find_layer("Logo_Glyph").unwrap();
    assert_eq!(doc.parent(logo.id()).map(Layer::name), Some("Version A"));
    assert_eq!(doc.parent(version_a.id()).map(Layer::name), Some("Versions"));
    assert!(doc.parent(versions.id()).is_none());

    assert_eq!(
        names(doc.descendants(versions.id()).into_iter()),
        vec![
            "Version C",
            "Title C",
            "Version B",
            "Title B",
            "Version A",
            "Logo_Glyph",
            "Title A",
            "Background A"
        ]
    );

    // Bounding dividers are listed but never attached
    let dividers: Vec<&Layer> = doc.layers().filter(|layer| layer.is_folder_end()).collect();
    assert_eq!(dividers.len(), 4);
    assert!(dividers.iter().all(|layer| layer.parent().is_none()));
}

#[test]
fn test_layer_properties() {
    let doc = parse(&versions_document().build()).unwrap();

    let version_a = doc.find_layer("Version A").unwrap();
    assert!(version_a.visible());
    assert_eq!(version_a.blend_mode().mode, Blend::PassThrough);
    assert_eq!(version_a.opacity(), 255);
    assert_eq!(version_a.blend_mode().opacity_percentage(), 100);

    let matte = doc.find_layer("Matte").unwrap();
    assert_eq!(matte.blend_mode().mode_name(), "multiply");
    assert_eq!(matte.blend_mode().opacity_percentage(), 50);

    let logo = doc.find_layer("Logo_Glyph").unwrap();
    assert_eq!(logo.legacy_name(), "Logo");
    assert_eq!(logo.width(), 142);
    assert_eq!(logo.height(), 179);
    assert_eq!(logo.left(), 379);
    assert_eq!(logo.top(), 210);
    assert_eq!(logo.layer_id(), Some(42));
    assert_eq!(logo.sheet_color(), Some(crate::layer::info::SheetColor::Orange));
    assert_eq!(logo.fill_opacity(), None);
    assert!(doc.find_layer("Logo").is_none());
}

#[test]
fn test_channel_offsets_point_at_data() {
    let raw = versions_document().build();
    let doc = parse(&raw).unwrap();
    let logo = doc.find_layer("Logo_Glyph").unwrap();
    let channels = logo.channels();
    assert_eq!(channels.len(), 4);
    for (channel, marker) in channels.iter().zip([0xFF, 0x10, 0x20, 0x30]) {
        assert_eq!(channel.length, 3);
        assert_eq!(raw[channel.data_offset as usize + 2], marker);
    }
}

#[test]
fn test_layer_comps() {
    let doc = parse(&versions_document().build()).unwrap();
    let comps = doc.layer_comps();
    let comp_names: Vec<&str> = comps.iter().map(|comp| comp.name.as_str()).collect();
    assert_eq!(comp_names, vec!["Version A", "Version B", "Version C"]);
    assert!(comps.iter().all(|comp| comp.id > 0));
    assert!(comps[0].applied);
}

#[test]
fn test_resources() {
    let doc = parse(&versions_document().build()).unwrap();
    assert_eq!(doc.resources().len(), 2);
    let resolution = doc.resource(ids::RESOLUTION_INFO).unwrap();
    assert_eq!(resolution.data.len(), 16);
    assert_eq!(resolution.name, None);
    assert!(doc.resource(ids::ICC_PROFILE).is_none());
}

#[test]
fn test_decode_is_deterministic() {
    let raw = Bytes::from(versions_document().build());
    let first = parse_bytes(raw.clone()).unwrap();
    let second = parse_bytes(raw).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_document_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Document>();
}

#[test]
fn test_indexed_color_mode_data() {
    let palette: Vec<u8> = (0..768).map(|i| (i % 256) as u8).collect();
    let raw = PsdBuilder::new(4, 4).color_mode(2, &palette).build();
    let doc = parse(&raw).unwrap();
    assert_eq!(doc.header().color_mode.name(), "IndexedColor");
    assert_eq!(doc.color_mode_data().len(), 768);
    assert_eq!(doc.color_mode_data()[255], 255);
    assert_eq!(doc.layer_count(), 0);
    assert_eq!(doc.roots().count(), 0);
    assert_eq!(doc.image_data_offset() as usize, raw.len() - 2);
}

#[test]
fn test_global_mask_and_document_info() {
    let mut mask = Vec::new();
    for v in [0u16, 0, 0, 0, 0, 100] {
        mask.extend_from_slice(&v.to_be_bytes());
    }
    mask.extend_from_slice(&[0, 0, 0, 0]);
    let raw = versions_document()
        .global_mask(&mask)
        .document_info(b"Patt", &[9, 9])
        .build();
    let doc = parse(&raw).unwrap();
    assert_eq!(doc.global_mask().map(|mask| mask.opacity), Some(100));
    assert_eq!(
        doc.document_info(Tag::new(*b"Patt")),
        Some(&LayerInfo::Raw(Bytes::from_static(&[9, 9])))
    );
}

#[test]
fn test_sixteen_bit_layers_from_lr16() {
    let body = crate::fixtures::layer_section(
        &[LayerBuilder::new("Deep"), LayerBuilder::new("Deeper")],
        false,
    );
    let raw = PsdBuilder::new(10, 10)
        .depth(16)
        .document_info(b"Lr16", &body)
        .build();
    let doc = parse(&raw).unwrap();
    assert_eq!(names(doc.layers()), vec!["Deeper", "Deep"]);
}

#[test]
fn test_merged_alpha() {
    let raw = PsdBuilder::new(10, 10)
        .layer(LayerBuilder::new("a"))
        .merged_alpha()
        .build();
    let doc = parse(&raw).unwrap();
    assert!(doc.merged_alpha());
    assert_eq!(doc.layer_count(), 1);
}

#[test]
fn test_unbalanced_folders() {
    let raw = PsdBuilder::new(10, 10)
        .layer(LayerBuilder::folder_end())
        .layer(LayerBuilder::new("inside"))
        .build();
    let doc = parse(&raw).unwrap();
    assert!(doc.had_unbalanced_folders());
    assert_eq!(names(doc.roots()), vec!["inside"]);
}

#[test]
fn test_bad_signature() {
    let mut raw = versions_document().build();
    raw[..4].copy_from_slice(b"8BPX");
    let err = parse(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSignature);
    assert_eq!(err.offset(), Some(0));
}

#[test]
fn test_large_document_version_is_rejected() {
    let raw = PsdBuilder::new(10, 10).version(2).build();
    let err = parse(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
}

#[test]
fn test_truncated_header() {
    let raw = versions_document().build();
    let err = parse(&raw[..20]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn test_invalid_layer_bounds() {
    let raw = PsdBuilder::new(10, 10)
        .layer(LayerBuilder::new("broken").rect(5, 5, 0, 10))
        .build();
    assert!(parse(&raw).is_err_and(|err| err.kind() == ErrorKind::InvalidBounds));
}

#[test]
fn test_vector_mask_strictness() {
    // version + flags + two records: 8 + 52 bytes, not 10 + 26n
    let mut payload = 3u32.to_be_bytes().to_vec();
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.extend_from_slice(&[0; 52]);
    let raw = PsdBuilder::new(10, 10)
        .layer(LayerBuilder::new("shape").info(b"vmsk", &payload))
        .build();

    let doc = parse(&raw).unwrap();
    let mask = doc.find_layer("shape").and_then(Layer::vector_mask).unwrap();
    assert!(mask.is_misaligned());
    assert_eq!(mask.paths.len(), 1);

    let strict = ParseOptions::new().with_strict(true);
    let err = parse_with_options(Bytes::from(raw), &strict).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedVectorMask);
}

#[test]
fn test_lenient_layer_info() {
    let raw = PsdBuilder::new(10, 10)
        .layer(LayerBuilder::new("short").info(b"fxrp", &[0; 8]))
        .build();
    assert!(parse(&raw).is_err_and(|err| err.kind() == ErrorKind::UnexpectedEof));

    let lenient = ParseOptions::new().with_lenient_layer_info(true);
    let doc = parse_with_options(Bytes::from(raw), &lenient).unwrap();
    let layer = doc.find_layer("short").unwrap();
    assert!(matches!(layer.info(Tag::new(*b"fxrp")), Some(LayerInfo::Raw(raw)) if raw.len() == 8));
}

#[test]
fn test_skip_layer_comps() {
    let raw = PsdBuilder::new(10, 10)
        .resource(ids::LAYER_COMPS, "", &[0, 0, 0, 16, 0xFF])
        .build();

    let options = ParseOptions::new().with_layer_comps(false).with_strict(true);
    let doc = parse_with_options(Bytes::from(raw), &options).unwrap();
    assert!(doc.layer_comps().is_empty());
    assert!(doc.resource(ids::LAYER_COMPS).is_some());
}

/// Comps resource whose single comp carries an extra item of type `kind`.
fn comps_with_item(kind: &[u8; 4], value: &[u8]) -> Vec<u8> {
    let mut w = DescriptorWriter::default();
    w.buf.extend_from_slice(&16u32.to_be_bytes());
    w.begin_object("null", 1).list("list", 1);
    w.list_object("Comp", 3)
        .long("compID", 7)
        .text("Nm  ", "Linked")
        .key("Pth ", kind);
    w.buf.extend_from_slice(value);
    w.buf
}

#[test]
fn test_layer_comps_with_file_path_item() {
    let mut path = 6u32.to_be_bytes().to_vec();
    path.extend_from_slice(b"txtu\0\0");
    let raw = PsdBuilder::new(10, 10)
        .resource(ids::LAYER_COMPS, "", &comps_with_item(b"Pth ", &path))
        .layer(LayerBuilder::new("only"))
        .build();

    let doc = parse(&raw).unwrap();
    assert_eq!(doc.layer_comps().len(), 1);
    assert_eq!(doc.layer_comps()[0].id, 7);
    assert_eq!(doc.layer_comps()[0].name, "Linked");
}

#[test]
fn test_damaged_layer_comps_are_not_fatal() {
    let raw = PsdBuilder::new(10, 10)
        .resource(ids::LAYER_COMPS, "", &comps_with_item(b"????", &[0; 8]))
        .layer(LayerBuilder::new("only"))
        .build();

    let doc = parse(&raw).unwrap();
    assert!(doc.layer_comps().is_empty());
    assert_eq!(doc.layer_count(), 1);
    let resource = doc.resource(ids::LAYER_COMPS).unwrap();
    assert!(!resource.data.is_empty());

    let options = ParseOptions::new().with_strict(true);
    let err = parse_with_options(Bytes::from(raw), &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDescriptor);
    assert!(err.offset().unwrap() > resource.data_offset);
}

#[test]
fn test_max_input_len() {
    let raw = Bytes::from(versions_document().build());
    let limit = raw.len() as u64 - 1;
    let options = ParseOptions::new().with_max_input_len(Some(limit));
    let err = parse_with_options(raw.clone(), &options).unwrap_err();
    assert!(matches!(err, PsdError::InputTooLarge { len, limit: l } if len == limit + 1 && l == limit));

    let options = ParseOptions::new().with_max_input_len(Some(limit + 1));
    assert!(parse_with_options(raw, &options).is_ok());
}

#[test]
fn test_open_file() {
    let raw = versions_document().build();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&raw).unwrap();
    file.flush().unwrap();

    let doc = Document::open(file.path()).unwrap();
    assert_eq!(doc.layer_count(), 15);
    assert_eq!(doc, Document::from_bytes(raw).unwrap());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Document::open(dir.path().join("missing.psd")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.offset(), None);
}

#[test]
fn test_parse_many_keeps_order() {
    let good = Bytes::from(versions_document().build());
    let small = Bytes::from(PsdBuilder::new(1, 1).build());
    let inputs = vec![good.clone(), Bytes::from_static(b"nope"), small];
    let results = parse_many(&inputs, &ParseOptions::default());
    assert_eq!(results.len(), 3);
    assert!(results[0].as_ref().is_ok_and(|doc| doc.layer_count() == 15));
    assert!(results[1].is_err());
    assert!(results[2].as_ref().is_ok_and(|doc| doc.header().width == 1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_truncated_input_is_an_error(cut in 0usize..1000) {
        let raw = versions_document().build();
        // The trailing merged image section is not read
        let cut = cut % (raw.len() - 2);
        prop_assert!(parse(&raw[..cut]).is_err());
    }

    #[test]
    fn prop_corrupted_input_never_panics(index in 0usize..1000, value in any::<u8>()) {
        let mut raw = versions_document().build();
        let index = index % raw.len();
        raw[index] = value;
        let _ = parse(&raw);
    }
}
