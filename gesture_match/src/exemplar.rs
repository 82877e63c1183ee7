//! In-memory exemplar store.
//!
//! Gestures are declared up front and kept in declaration order; that order
//! breaks score ties in the classifier.  Each gesture's exemplars are kept
//! sorted by id.

use hand_pose::{normalize, LandmarkFrame, NormalizedVector};

pub type ExemplarId = u32;

// ════════════════════════════════════════════════════════════════════════════
// Exemplar
// ════════════════════════════════════════════════════════════════════════════

/// A normalized reference vector for one gesture.  Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct Exemplar {
    gesture: String,
    id:      ExemplarId,
    vector:  NormalizedVector,
}

impl Exemplar {
    pub fn new(gesture: impl Into<String>, id: ExemplarId, vector: NormalizedVector) -> Self {
        Exemplar { gesture: gesture.into(), id, vector }
    }

    pub fn gesture(&self) -> &str               { &self.gesture }
    pub fn id(&self)      -> ExemplarId         { self.id }
    pub fn vector(&self)  -> &NormalizedVector  { &self.vector }
}

// ════════════════════════════════════════════════════════════════════════════
// ExemplarStore
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExemplarStore {
    gestures: Vec<(String, Vec<Exemplar>)>,
}

impl ExemplarStore {
    /// A store that knows `names`, all with zero exemplars.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = ExemplarStore::default();
        for n in names { store.declare(n); }
        store
    }

    /// Add a gesture name if it is not already known.
    pub fn declare(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.slot(&name).is_none() {
            self.gestures.push((name, Vec::new()));
        }
    }

    /// Declared names, in declaration order.
    pub fn gesture_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.gestures.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, exemplars)` for every declared gesture, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Exemplar])> + '_ {
        self.gestures.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Exemplars of `gesture` ordered by id; empty if unknown or none captured.
    pub fn load(&self, gesture: &str) -> &[Exemplar] {
        self.slot(gesture).map(|i| self.gestures[i].1.as_slice()).unwrap_or(&[])
    }

    /// One more than the largest id held for `gesture`, or 1.  `None` once
    /// `ExemplarId::MAX` is taken.
    pub fn next_id(&self, gesture: &str) -> Option<ExemplarId> {
        match self.load(gesture).iter().map(|e| e.id).max() {
            Some(m) => m.checked_add(1),
            None    => Some(1),
        }
    }

    /// Store `vector` under the next id for `gesture`, declaring the gesture if
    /// needed.  `None` (and nothing stored) when ids are exhausted.
    pub fn append(&mut self, gesture: &str, vector: NormalizedVector) -> Option<&Exemplar> {
        let id = self.next_id(gesture)?;
        Some(self.insert(Exemplar::new(gesture, id, vector)))
    }

    /// Insert an exemplar with a caller-chosen id (e.g. read from a filename),
    /// keeping id order.  An existing exemplar with the same id is replaced.
    pub fn insert(&mut self, exemplar: Exemplar) -> &Exemplar {
        self.declare(exemplar.gesture.as_str());
        let slot = self.slot(&exemplar.gesture).unwrap_or(0);
        let list = &mut self.gestures[slot].1;
        let pos = match list.binary_search_by_key(&exemplar.id, |e| e.id) {
            Ok(p)  => { list[p] = exemplar; p }
            Err(p) => { list.insert(p, exemplar); p }
        };
        &list[pos]
    }

    /// Copy of the store without one exemplar (leave-one-out evaluation).
    pub fn without(&self, gesture: &str, id: ExemplarId) -> ExemplarStore {
        let gestures = self.gestures.iter()
            .map(|(n, v)| {
                let kept = v.iter()
                    .filter(|e| !(n == gesture && e.id == id))
                    .cloned()
                    .collect();
                (n.clone(), kept)
            })
            .collect();
        ExemplarStore { gestures }
    }

    /// Total exemplar count across all gestures.
    pub fn len(&self) -> usize {
        self.gestures.iter().map(|(_, v)| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn slot(&self, name: &str) -> Option<usize> {
        self.gestures.iter().position(|(n, _)| n == name)
    }
}

/// Normalize `frame` and append it to `store` under `gesture`.
pub fn append_exemplar(store: &mut ExemplarStore, gesture: &str, frame: &LandmarkFrame) -> Option<ExemplarId> {
    store.append(gesture, normalize(frame)).map(Exemplar::id)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
