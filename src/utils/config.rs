//------------ DefMinMax -----------------------------------------------------

/// The default value and allowed range of a config variable.
#[derive(Clone, Copy)]
pub struct DefMinMax<T> {
    /// The default value.
    def: T,

    /// The smallest allowed value.
    min: T,

    /// The largest allowed value.
    max: T,
}

impl<T> DefMinMax<T> {
    /// Creates a new value.
    pub const fn new(def: T, min: T, max: T) -> Self {
        Self { def, min, max }
    }

    /// Returns the default value.
    pub fn default(self) -> T {
        self.def
    }

    /// Trims the given value to fit into the allowed range.
    pub fn limit(self, value: T) -> T
    where
        T: Ord,
    {
        value.clamp(self.min, self.max)
    }
}
