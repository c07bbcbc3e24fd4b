//! Test-only writers that assemble documents byte by byte.

pub(crate) fn unicode(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut raw = (units.len() as u32).to_be_bytes().to_vec();
    for unit in units {
        raw.extend_from_slice(&unit.to_be_bytes());
    }
    raw
}

pub(crate) fn pascal(text: &str, align: usize) -> Vec<u8> {
    let mut raw = vec![text.len() as u8];
    raw.extend_from_slice(text.as_bytes());
    while raw.len() % align != 0 {
        raw.push(0);
    }
    raw
}

/// Length-prefixed block, padded to `align` after the payload.
pub(crate) fn section(payload: &[u8], align: usize) -> Vec<u8> {
    let mut raw = (payload.len() as u32).to_be_bytes().to_vec();
    raw.extend_from_slice(payload);
    while (raw.len() - 4) % align != 0 {
        raw.push(0);
    }
    raw
}

/// Additional layer info record.
pub(crate) fn info_record(key: &[u8; 4], payload: &[u8], align: usize) -> Vec<u8> {
    let mut raw = b"8BIM".to_vec();
    raw.extend_from_slice(key);
    raw.extend(section(payload, align));
    raw
}

/// Section divider payload.
pub(crate) fn divider(kind: u32) -> Vec<u8> {
    let mut raw = kind.to_be_bytes().to_vec();
    if kind != 3 {
        raw.extend_from_slice(b"8BIMpass");
    }
    raw
}

#[derive(Debug, Clone)]
pub(crate) struct LayerBuilder {
    rect: [i32; 4],
    channels: Vec<(i16, Vec<u8>)>,
    blend_signature: [u8; 4],
    blend_key: [u8; 4],
    opacity: u8,
    flags: u8,
    mask: Vec<u8>,
    blending_ranges: Vec<u8>,
    name: String,
    infos: Vec<u8>,
}

impl LayerBuilder {
    pub(crate) fn new(name: &str) -> Self {
        LayerBuilder {
            rect: [0; 4],
            channels: Vec::new(),
            blend_signature: *b"8BIM",
            blend_key: *b"norm",
            opacity: 255,
            flags: 0,
            mask: Vec::new(),
            blending_ranges: Vec::new(),
            name: name.to_string(),
            infos: Vec::new(),
        }
    }

    /// Open folder record (the record that follows its children in file order).
    pub(crate) fn folder(name: &str) -> Self {
        Self::new(name).blend(b"pass").info(b"lsct", &divider(1))
    }

    /// Bounding divider preceding a folder's children in file order.
    pub(crate) fn folder_end() -> Self {
        Self::new("</Layer group>").hidden().info(b"lsct", &divider(3))
    }

    pub(crate) fn rect(mut self, top: i32, left: i32, bottom: i32, right: i32) -> Self {
        self.rect = [top, left, bottom, right];
        self
    }

    pub(crate) fn channel(mut self, id: i16, data: &[u8]) -> Self {
        self.channels.push((id, data.to_vec()));
        self
    }

    pub(crate) fn blend_signature(mut self, signature: &[u8; 4]) -> Self {
        self.blend_signature = *signature;
        self
    }

    pub(crate) fn blend(mut self, key: &[u8; 4]) -> Self {
        self.blend_key = *key;
        self
    }

    pub(crate) fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.flags |= 0b10;
        self
    }

    pub(crate) fn mask(mut self, mask: &[u8]) -> Self {
        self.mask = mask.to_vec();
        self
    }

    pub(crate) fn blending_ranges(mut self, ranges: &[u8]) -> Self {
        self.blending_ranges = ranges.to_vec();
        self
    }

    pub(crate) fn info(mut self, key: &[u8; 4], payload: &[u8]) -> Self {
        self.infos.extend(info_record(key, payload, 2));
        self
    }

    pub(crate) fn unicode_name(self, name: &str) -> Self {
        self.info(b"luni", &unicode(name))
    }

    fn record(&self) -> Vec<u8> {
        let mut raw = Vec::new();
        for v in self.rect {
            raw.extend_from_slice(&v.to_be_bytes());
        }
        raw.extend_from_slice(&(self.channels.len() as u16).to_be_bytes());
        for (id, data) in &self.channels {
            raw.extend_from_slice(&id.to_be_bytes());
            raw.extend_from_slice(&(data.len() as u32).to_be_bytes());
        }
        raw.extend_from_slice(&self.blend_signature);
        raw.extend_from_slice(&self.blend_key);
        raw.extend_from_slice(&[self.opacity, 0, self.flags, 0]);

        let mut extra = section(&self.mask, 1);
        extra.extend(section(&self.blending_ranges, 1));
        extra.extend(pascal(&self.name, 4));
        extra.extend_from_slice(&self.infos);
        raw.extend(section(&extra, 1));
        raw
    }
}

/// Layer info sub-section body: count, records, channel data. No padding.
pub(crate) fn layer_section(layers: &[LayerBuilder], merged_alpha: bool) -> Vec<u8> {
    let count = layers.len() as i16;
    let count = if merged_alpha { -count } else { count };
    let mut raw = count.to_be_bytes().to_vec();
    for layer in layers {
        raw.extend(layer.record());
    }
    for layer in layers {
        for (_, data) in &layer.channels {
            raw.extend_from_slice(data);
        }
    }
    raw
}

/// Whole-document writer.
#[derive(Debug, Clone)]
pub(crate) struct PsdBuilder {
    version: u16,
    channels: u16,
    width: u32,
    height: u32,
    depth: u16,
    color_mode: u16,
    color_mode_data: Vec<u8>,
    resources: Vec<u8>,
    layers: Vec<LayerBuilder>,
    merged_alpha: bool,
    global_mask: Vec<u8>,
    document_infos: Vec<u8>,
}

impl PsdBuilder {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        PsdBuilder {
            version: 1,
            channels: 3,
            width,
            height,
            depth: 8,
            color_mode: 3,
            color_mode_data: Vec::new(),
            resources: Vec::new(),
            layers: Vec::new(),
            merged_alpha: false,
            global_mask: Vec::new(),
            document_infos: Vec::new(),
        }
    }

    pub(crate) fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn color_mode(mut self, mode: u16, data: &[u8]) -> Self {
        self.color_mode = mode;
        self.color_mode_data = data.to_vec();
        self
    }

    pub(crate) fn depth(mut self, depth: u16) -> Self {
        self.depth = depth;
        self
    }

    pub(crate) fn resource(mut self, id: u16, name: &str, data: &[u8]) -> Self {
        self.resources.extend_from_slice(b"8BIM");
        self.resources.extend_from_slice(&id.to_be_bytes());
        self.resources.extend(pascal(name, 2));
        self.resources.extend(section(data, 2));
        self
    }

    /// Append a layer record. Records are written in the order added, which
    /// is bottom-most first.
    pub(crate) fn layer(mut self, layer: LayerBuilder) -> Self {
        self.layers.push(layer);
        self
    }

    pub(crate) fn merged_alpha(mut self) -> Self {
        self.merged_alpha = true;
        self
    }

    pub(crate) fn global_mask(mut self, mask: &[u8]) -> Self {
        self.global_mask = mask.to_vec();
        self
    }

    /// Document-level record, padded to 4.
    pub(crate) fn document_info(mut self, key: &[u8; 4], payload: &[u8]) -> Self {
        self.document_infos.extend(info_record(key, payload, 4));
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut raw = b"8BPS".to_vec();
        raw.extend_from_slice(&self.version.to_be_bytes());
        raw.extend_from_slice(&[0; 6]);
        raw.extend_from_slice(&self.channels.to_be_bytes());
        raw.extend_from_slice(&self.height.to_be_bytes());
        raw.extend_from_slice(&self.width.to_be_bytes());
        raw.extend_from_slice(&self.depth.to_be_bytes());
        raw.extend_from_slice(&self.color_mode.to_be_bytes());

        raw.extend(section(&self.color_mode_data, 1));
        raw.extend(section(&self.resources, 1));

        let mut layer_and_mask = Vec::new();
        if self.layers.is_empty() {
            layer_and_mask.extend_from_slice(&0u32.to_be_bytes());
        } else {
            layer_and_mask.extend(section(&layer_section(&self.layers, self.merged_alpha), 2));
        }
        layer_and_mask.extend(section(&self.global_mask, 1));
        layer_and_mask.extend_from_slice(&self.document_infos);
        raw.extend(section(&layer_and_mask, 1));

        // Raw, empty merged image
        raw.extend_from_slice(&[0, 0]);
        raw
    }
}
