use std::fmt;
use std::rc::Rc;

/// A value that is either fixed at construction or re-read on every use.
pub enum Source<T> {
    Fixed(T),
    Dynamic(Rc<dyn Fn() -> T>),
}

impl<T> Source<T> {
    pub fn dynamic(supplier: impl Fn() -> T + 'static) -> Self {
        Self::Dynamic(Rc::new(supplier))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl<T: Clone> Source<T> {
    pub fn get(&self) -> T {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Dynamic(supplier) => supplier(),
        }
    }
}

impl<T: Clone + 'static> Source<T> {
    pub fn map<U>(&self, f: impl Fn(T) -> U + 'static) -> Source<U> {
        let inner = self.clone();
        Source::dynamic(move || f(inner.get()))
    }
}

impl<T: Clone> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(value) => Self::Fixed(value.clone()),
            Self::Dynamic(supplier) => Self::Dynamic(Rc::clone(supplier)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<f64> for Source<f64> {
    fn from(value: f64) -> Self {
        Self::Fixed(value)
    }
}

impl From<crate::Size> for Source<crate::Size> {
    fn from(value: crate::Size) -> Self {
        Self::Fixed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_dynamic_source_is_read_every_time() {
        let counter = Rc::new(Cell::new(0.0));
        let source = {
            let counter = counter.clone();
            Source::dynamic(move || {
                counter.set(counter.get() + 1.0);
                counter.get()
            })
        };

        assert_eq!(source.get(), 1.0);
        assert_eq!(source.get(), 2.0);
        assert!(source.is_dynamic());
    }

    #[test]
    fn test_map_tracks_the_inner_source() {
        let height = Rc::new(Cell::new(800.0));
        let base = {
            let height = height.clone();
            Source::dynamic(move || height.get())
        };
        let eighth = base.map(|h| h / 8.0);

        assert_eq!(eighth.get(), 100.0);
        height.set(1600.0);
        assert_eq!(eighth.get(), 200.0);
    }

    #[test]
    fn test_fixed_source() {
        let source: Source<f64> = 12.5.into();
        assert_eq!(source.get(), 12.5);
        assert!(!source.is_dynamic());
        assert_eq!(format!("{:?}", source), "Fixed(12.5)");
    }
}
