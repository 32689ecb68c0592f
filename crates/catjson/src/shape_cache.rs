//! Process-wide cache of record descriptors.
//!
//! A record's member table is built the first time any thread needs it and
//! reused afterwards. Concurrent first requests for the same type build it
//! once: the read path never builds, and the write path re-checks under the
//! lock before building. `describe` implementations run under the write lock
//! and must not consult the cache themselves.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::shape::{JsonShape, RecordDescriptor, RecordShape, Shape, ShapeKind};

type DescriptorTable = RwLock<HashMap<TypeId, Arc<RecordDescriptor>>>;

static DESCRIPTORS: OnceLock<DescriptorTable> = OnceLock::new();

fn table() -> &'static DescriptorTable {
    DESCRIPTORS.get_or_init(Default::default)
}

/// Descriptor of a record shape; `None` for other shape kinds.
pub fn descriptor(shape: &Shape) -> Option<Arc<RecordDescriptor>> {
    match &shape.kind {
        ShapeKind::Record(record) => Some(record_descriptor(shape, record)),
        _ => None,
    }
}

pub fn descriptor_of<T: JsonShape>() -> Option<Arc<RecordDescriptor>> {
    descriptor(&T::shape())
}

/// Whether the descriptor for `id` has been built.
pub fn is_cached(id: TypeId) -> bool {
    table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&id)
}

pub(crate) fn record_descriptor(shape: &Shape, record: &RecordShape) -> Arc<RecordDescriptor> {
    {
        let table = table().read().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = table.get(&shape.id) {
            return existing.clone();
        }
    }
    let mut table = table().write().unwrap_or_else(PoisonError::into_inner);
    table
        .entry(shape.id)
        .or_insert_with(|| {
            let descriptor = (record.describe)();
            debug!(
                record = shape.name,
                members = descriptor.len(),
                "built record descriptor"
            );
            Arc::new(descriptor)
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Record, RecordBuilder};

    #[derive(Default)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Record for Point {
        fn describe(members: &mut RecordBuilder<Self>) {
            members
                .field("x", |p| &p.x, |p| &mut p.x)
                .field("y", |p| &p.y, |p| &mut p.y);
        }
    }

    impl JsonShape for Point {
        fn shape() -> Shape {
            Shape::record::<Self>()
        }
    }

    #[test]
    fn descriptor_is_shared() {
        let a = descriptor_of::<Point>().unwrap();
        let b = descriptor_of::<Point>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(is_cached(TypeId::of::<Point>()));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn non_records_have_no_descriptor() {
        assert!(descriptor_of::<Vec<Point>>().is_none());
        assert!(descriptor_of::<u8>().is_none());
    }
}
