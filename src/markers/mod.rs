//! Map markers derived from cached entities.
//!
//! The reconciler owns one marker per live entity id per layer and keeps a
//! [`MapSurface`] in step with it: removed ids are detached, surviving ids are
//! updated in place, new ids are attached when their layer is visible. Markers
//! are a disposable projection of the entity cache and never a data source.

pub mod projection;
pub mod surface;

use std::collections::{BTreeMap, HashMap};

use crate::models::{Coordinates, DisasterSeverity, LocationType, SafetyStatus};

pub use surface::CanvasSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Friends,
    Locations,
    Weather,
    Disasters,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Friends, Layer::Locations, Layer::Weather, Layer::Disasters];

    /// Singleton layers hold at most one marker, replaced on every update.
    pub fn is_singleton(self) -> bool {
        matches!(self, Layer::Weather)
    }

    pub fn title(self) -> &'static str {
        match self {
            Layer::Friends => "Friends",
            Layer::Locations => "Locations",
            Layer::Weather => "Weather",
            Layer::Disasters => "Disasters",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey {
    pub layer: Layer,
    pub id: String,
}

impl MarkerKey {
    pub fn new(layer: Layer, id: impl Into<String>) -> Self {
        Self { layer, id: id.into() }
    }
}

/// Identity of a marker instance. A marker updated in place or hidden and
/// shown again keeps its handle; a recreated marker gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Glyph {
    Friend(SafetyStatus),
    Place(LocationType),
    Weather,
    Disaster(DisasterSeverity),
}

/// What a marker should look like, as computed from one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub id: String,
    pub position: Coordinates,
    pub label: String,
    pub popup: Vec<String>,
    pub glyph: Glyph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub key: MarkerKey,
    pub position: Coordinates,
    pub label: String,
    pub popup: Vec<String>,
    pub glyph: Glyph,
}

impl Marker {
    fn apply(&mut self, spec: MarkerSpec) {
        self.position = spec.position;
        self.label = spec.label;
        self.popup = spec.popup;
        self.glyph = spec.glyph;
    }
}

/// Drawing target for markers.
pub trait MapSurface {
    fn attach(&mut self, marker: &Marker);
    fn update(&mut self, marker: &Marker);
    fn detach(&mut self, key: &MarkerKey);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

struct LayerState {
    visible: bool,
    markers: BTreeMap<String, Marker>,
}

impl LayerState {
    fn new(visible: bool) -> Self {
        Self {
            visible,
            markers: BTreeMap::new(),
        }
    }
}

pub struct MarkerReconciler<S: MapSurface> {
    surface: S,
    layers: HashMap<Layer, LayerState>,
    next_handle: u64,
}

impl<S: MapSurface> MarkerReconciler<S> {
    /// All layers start visible.
    pub fn new(surface: S) -> Self {
        let layers = Layer::ALL
            .iter()
            .map(|layer| (*layer, LayerState::new(true)))
            .collect();
        Self {
            surface,
            layers,
            next_handle: 1,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_visible(&self, layer: Layer) -> bool {
        self.layers.get(&layer).map(|s| s.visible).unwrap_or(false)
    }

    pub fn markers(&self, layer: Layer) -> impl Iterator<Item = &Marker> {
        self.layers
            .get(&layer)
            .into_iter()
            .flat_map(|state| state.markers.values())
    }

    pub fn marker(&self, key: &MarkerKey) -> Option<&Marker> {
        self.layers.get(&key.layer)?.markers.get(&key.id)
    }

    pub fn ids(&self, layer: Layer) -> Vec<String> {
        self.markers(layer).map(|m| m.key.id.clone()).collect()
    }

    pub fn len(&self, layer: Layer) -> usize {
        self.layers.get(&layer).map(|s| s.markers.len()).unwrap_or(0)
    }

    fn allocate_handle(&mut self) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Bring `layer` in line with `specs`, the full live collection.
    pub fn reconcile<I>(&mut self, layer: Layer, specs: I) -> ReconcileStats
    where
        I: IntoIterator<Item = MarkerSpec>,
    {
        if layer.is_singleton() {
            return self.replace_singleton(layer, specs.into_iter().last());
        }

        let specs: Vec<MarkerSpec> = specs.into_iter().collect();
        let mut stats = ReconcileStats::default();

        // Step 1: drop markers whose entity disappeared.
        let stale: Vec<String> = match self.layers.get(&layer) {
            Some(state) => state
                .markers
                .keys()
                .filter(|id| !specs.iter().any(|s| &s.id == *id))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        for id in stale {
            self.remove(layer, &id);
            stats.removed += 1;
        }

        // Step 2: update survivors in place, create the rest.
        for spec in specs {
            if self.update_in_place(layer, spec.clone()) {
                stats.updated += 1;
            } else {
                self.create(layer, spec);
                stats.added += 1;
            }
        }

        tracing::debug!(
            "Reconciled {} markers: +{} ~{} -{}",
            layer.title(),
            stats.added,
            stats.updated,
            stats.removed
        );
        stats
    }

    /// Remove-then-create for singleton layers. `None` just clears the layer.
    pub fn replace_singleton(&mut self, layer: Layer, spec: Option<MarkerSpec>) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let existing: Vec<String> = self
            .layers
            .get(&layer)
            .map(|s| s.markers.keys().cloned().collect())
            .unwrap_or_default();
        for id in existing {
            self.remove(layer, &id);
            stats.removed += 1;
        }
        if let Some(spec) = spec {
            self.create(layer, spec);
            stats.added += 1;
        }
        stats
    }

    fn remove(&mut self, layer: Layer, id: &str) {
        let Some(state) = self.layers.get_mut(&layer) else {
            return;
        };
        if let Some(marker) = state.markers.remove(id) {
            if state.visible {
                self.surface.detach(&marker.key);
            }
        }
    }

    fn update_in_place(&mut self, layer: Layer, spec: MarkerSpec) -> bool {
        let Some(state) = self.layers.get_mut(&layer) else {
            return false;
        };
        let Some(marker) = state.markers.get_mut(&spec.id) else {
            return false;
        };
        marker.apply(spec);
        if state.visible {
            self.surface.update(marker);
        }
        true
    }

    fn create(&mut self, layer: Layer, spec: MarkerSpec) {
        let handle = self.allocate_handle();
        let marker = Marker {
            handle,
            key: MarkerKey::new(layer, spec.id.clone()),
            position: spec.position,
            label: spec.label,
            popup: spec.popup,
            glyph: spec.glyph,
        };
        let state = self
            .layers
            .entry(layer)
            .or_insert_with(|| LayerState::new(true));
        if state.visible {
            self.surface.attach(&marker);
        }
        state.markers.insert(spec.id, marker);
    }

    /// Show or hide a layer. Hidden markers are detached but kept, so showing
    /// the layer again reattaches the very same instances.
    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        let state = self
            .layers
            .entry(layer)
            .or_insert_with(|| LayerState::new(visible));
        if state.visible == visible {
            return;
        }
        state.visible = visible;
        for marker in state.markers.values() {
            if visible {
                self.surface.attach(marker);
            } else {
                self.surface.detach(&marker.key);
            }
        }
    }

    /// Flip a layer's visibility and return the new state.
    pub fn toggle_layer(&mut self, layer: Layer) -> bool {
        let visible = !self.is_visible(layer);
        self.set_layer_visible(layer, visible);
        visible
    }

    /// Remove every marker from every layer; visibility settings are kept.
    pub fn clear(&mut self) {
        for layer in Layer::ALL {
            self.replace_singleton(layer, None);
        }
    }
}
