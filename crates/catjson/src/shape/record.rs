//! Record members: named fields and properties with typed accessors.

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;

use super::{unbox, Boxed, JsonShape, Shape, ShapeFn};
use crate::error::JsonError;

/// A struct decoded from and encoded to a JSON object.
///
/// `describe` lists the members once per type; the resulting
/// [`RecordDescriptor`] is cached for the life of the process.
pub trait Record: Default + 'static {
    fn describe(members: &mut RecordBuilder<Self>);

    /// Runs after every member present in the input has been assigned.
    fn on_decode_finished(&mut self) {}
}

/// A fieldless enum carried as an integer ordinal.
pub trait JsonEnum: Sized + 'static {
    fn from_ordinal(ordinal: i64) -> Option<Self>;

    fn ordinal(&self) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Direct storage, assigned in place.
    Field,
    /// Assigned through a setter.
    Property,
}

/// Type-erased read and write access to one member of a record.
pub trait MemberAccess: Send + Sync {
    fn get<'r>(&self, record: &'r dyn Any) -> Option<&'r dyn Any>;

    fn set(&self, record: &mut dyn Any, value: Boxed) -> Result<(), JsonError>;
}

struct FieldAccess<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T: 'static, F: 'static> MemberAccess for FieldAccess<T, F> {
    fn get<'r>(&self, record: &'r dyn Any) -> Option<&'r dyn Any> {
        record
            .downcast_ref::<T>()
            .map(|r| (self.get)(r) as &dyn Any)
    }

    fn set(&self, record: &mut dyn Any, value: Boxed) -> Result<(), JsonError> {
        let record = record.downcast_mut::<T>().ok_or(JsonError::ShapeMismatch {
            shape: type_name::<T>(),
        })?;
        *(self.get_mut)(record) = unbox::<F>(value)?;
        Ok(())
    }
}

struct PropertyAccess<T, F> {
    get: fn(&T) -> &F,
    set: fn(&mut T, F),
}

impl<T: 'static, F: 'static> MemberAccess for PropertyAccess<T, F> {
    fn get<'r>(&self, record: &'r dyn Any) -> Option<&'r dyn Any> {
        record
            .downcast_ref::<T>()
            .map(|r| (self.get)(r) as &dyn Any)
    }

    fn set(&self, record: &mut dyn Any, value: Boxed) -> Result<(), JsonError> {
        let record = record.downcast_mut::<T>().ok_or(JsonError::ShapeMismatch {
            shape: type_name::<T>(),
        })?;
        (self.set)(record, unbox::<F>(value)?);
        Ok(())
    }
}

pub struct Member {
    name: String,
    kind: MemberKind,
    shape: ShapeFn,
    access: Box<dyn MemberAccess>,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    pub fn get<'r>(&self, record: &'r dyn Any) -> Option<&'r dyn Any> {
        self.access.get(record)
    }

    pub fn set(&self, record: &mut dyn Any, value: Boxed) -> Result<(), JsonError> {
        self.access.set(record, value)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("shape", &self.shape().name)
            .finish()
    }
}

/// Name-keyed member table of one record type, in declaration order.
#[derive(Debug)]
pub struct RecordDescriptor {
    name: &'static str,
    members: IndexMap<String, Member>,
}

impl RecordDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Collects the members of `T`.
///
/// When a field and a property share a name the property wins, regardless
/// of declaration order. Otherwise a later declaration replaces an earlier
/// one in place.
pub struct RecordBuilder<T> {
    members: IndexMap<String, Member>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RecordBuilder<T> {
    fn new() -> Self {
        Self {
            members: IndexMap::new(),
            _record: PhantomData,
        }
    }

    pub fn field<F: JsonShape>(
        &mut self,
        name: &str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> &mut Self {
        self.add(Member {
            name: name.to_string(),
            kind: MemberKind::Field,
            shape: F::shape,
            access: Box::new(FieldAccess { get, get_mut }),
        })
    }

    pub fn property<F: JsonShape>(
        &mut self,
        name: &str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> &mut Self {
        self.add(Member {
            name: name.to_string(),
            kind: MemberKind::Property,
            shape: F::shape,
            access: Box::new(PropertyAccess { get, set }),
        })
    }

    fn add(&mut self, member: Member) -> &mut Self {
        match self.members.get_mut(&member.name) {
            Some(existing)
                if existing.kind == MemberKind::Property && member.kind == MemberKind::Field => {}
            Some(existing) => *existing = member,
            None => {
                self.members.insert(member.name.clone(), member);
            }
        }
        self
    }
}

pub(super) fn describe<T: Record>() -> RecordDescriptor {
    let mut builder = RecordBuilder::<T>::new();
    T::describe(&mut builder);
    RecordDescriptor {
        name: type_name::<T>(),
        members: builder.members,
    }
}

pub(super) fn finish<T: Record>(record: &mut dyn Any) {
    if let Some(record) = record.downcast_mut::<T>() {
        record.on_decode_finished();
    }
}

pub(super) fn enum_from_ordinal<T: JsonEnum>(ordinal: i64) -> Option<Boxed> {
    T::from_ordinal(ordinal).map(|v| Box::new(v) as Boxed)
}

pub(super) fn enum_to_ordinal<T: JsonEnum>(value: &dyn Any) -> Option<i64> {
    value.downcast_ref::<T>().map(JsonEnum::ordinal)
}
