use std::collections::BTreeMap;

use super::{MapSurface, Marker, MarkerKey};

/// Marker surface backing the terminal map: whatever is attached here is what
/// the canvas draws on the next frame.
#[derive(Debug, Default)]
pub struct CanvasSurface {
    attached: BTreeMap<MarkerKey, Marker>,
}

impl CanvasSurface {
    pub fn attached(&self) -> impl Iterator<Item = &Marker> {
        self.attached.values()
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&Marker> {
        self.attached.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

impl MapSurface for CanvasSurface {
    fn attach(&mut self, marker: &Marker) {
        self.attached.insert(marker.key.clone(), marker.clone());
    }

    fn update(&mut self, marker: &Marker) {
        if let Some(drawn) = self.attached.get_mut(&marker.key) {
            *drawn = marker.clone();
        }
    }

    fn detach(&mut self, key: &MarkerKey) {
        self.attached.remove(key);
    }
}
