//! Named effect parameters.

use smallvec::SmallVec;

/// One control exposed by the effects device.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub id: String,
    pub min: f32,
    pub max: f32,
}

impl ParameterInfo {
    pub fn new(name: &str, id: &str, min: f32, max: f32) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            min,
            max,
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Exact(usize),
    Partial(usize),
}

impl Resolution {
    pub fn index(&self) -> usize {
        match *self {
            Resolution::Exact(i) | Resolution::Partial(i) => i,
        }
    }
}

/// Find `key` in the registry: exact name or id first, then the first entry
/// whose name or id contains it (so `feedback` finds `feedback[1]`).
pub fn resolve(registry: &[ParameterInfo], key: &str) -> Option<Resolution> {
    if key.is_empty() {
        return None;
    }
    if let Some(i) = registry.iter().position(|p| p.name == key || p.id == key) {
        return Some(Resolution::Exact(i));
    }
    registry
        .iter()
        .position(|p| p.name.contains(key) || p.id.contains(key))
        .map(Resolution::Partial)
}

/// Last value written per control name, in first-write order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    values: SmallVec<[(String, f32); 4]>,
}

impl ParameterSet {
    pub fn from_pairs(pairs: &[(String, f32)]) -> Self {
        let mut set = Self::default();
        for (name, value) in pairs {
            set.set(name, *value);
        }
        set
    }

    pub fn set(&mut self, name: &str, value: f32) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
