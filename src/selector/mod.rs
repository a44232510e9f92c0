//! Transmissible projections and the columnar output they produce
//!
//! A selector names a path into a value, ending at the part of it a query
//! should return. Selector trees have the same shape as projection predicates
//! (see [`crate::projection`]): one variant per sub-field, plus an `Atom`
//! variant meaning "the value itself".
//!
//! Query results are returned column-wise. Each selector of a query produces
//! one [`QueryOutputBatchBox`], a typed vector holding the projected value of
//! every matching item, and the columns of a page travel together as a
//! [`QueryOutputBatchBoxTuple`].

use crate::model::{
    Account, AccountId, Asset, AssetDefinition, AssetDefinitionId, AssetId, AssetValue,
    BlockHeader, Domain, DomainId, Hash, Json, Metadata, Name, Numeric, PeerId, Permission,
    PublicKey, Role, RoleId,
};
use crate::{Decode, Encode};

/// Projection of values of `T` into output boxes.
pub trait EvaluateSelector<T> {
    /// Projects a single value.
    fn project(&self, input: &T) -> SelectedValue;

    /// Projects every item into one output column.
    ///
    /// The column has the same type whether or not `items` is empty.
    fn project_column<'a, I>(&self, items: I) -> QueryOutputBatchBox
    where
        I: Iterator<Item = &'a T>,
        T: 'a;
}

/// The selectors of a query, one output column per entry
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SelectorTuple<S>(pub Vec<S>);

impl<S> SelectorTuple<S> {
    #[must_use]
    pub fn new(selectors: Vec<S>) -> Self {
        Self(selectors)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Projects `items` through every selector in turn.
    pub fn project_batch<T>(&self, items: &[T]) -> QueryOutputBatchBoxTuple
    where
        S: EvaluateSelector<T>,
    {
        QueryOutputBatchBoxTuple {
            tuple: self
                .0
                .iter()
                .map(|selector| selector.project_column(items.iter()))
                .collect(),
        }
    }
}

/// A single selector that returns whole values.
impl<S: Default> Default for SelectorTuple<S> {
    fn default() -> Self {
        Self(vec![S::default()])
    }
}

impl<S> From<S> for SelectorTuple<S> {
    fn from(selector: S) -> Self {
        Self(vec![selector])
    }
}

/// Types that may appear as the output of a selector
pub trait SelectedKind: Sized {
    fn into_value(self) -> SelectedValue;

    /// Wraps a vector of values as an output column.
    fn into_batch(items: Vec<Self>) -> QueryOutputBatchBox;

    /// Unwraps an output column of this type, handing back any other column.
    fn from_batch(batch: QueryOutputBatchBox) -> Result<Vec<Self>, QueryOutputBatchBox>;

    /// Unwraps a single value of this type, handing back any other value.
    fn from_value(value: SelectedValue) -> Result<Self, SelectedValue>;
}

macro_rules! selected_values {
    ( $( $variant:ident ( $t:ty ) = $tag:tt ),+ $(,)? ) => {
        /// A single projected value
        ///
        /// Whole-entity variants keep the tags of the query output table;
        /// tags 5 (parameters), 7 (transactions) and 10 to 12 (triggers and
        /// blocks) are reserved. Projected components follow from tag 14.
        #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
        pub enum SelectedValue {
            $(
                #[codec(tag = $tag)]
                $variant($t),
            )+
        }

        /// One output column: the projections of a run of items through the
        /// same selector
        #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
        pub enum QueryOutputBatchBox {
            $(
                #[codec(tag = $tag)]
                $variant(Vec<$t>),
            )+
        }

        impl SelectedValue {
            /// Name of the type of the value
            #[must_use]
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($variant), )+
                }
            }
        }

        impl QueryOutputBatchBox {
            #[must_use]
            pub fn len(&self) -> usize {
                match self {
                    $( Self::$variant(column) => column.len(), )+
                }
            }

            /// Name of the element type of the column
            #[must_use]
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($variant), )+
                }
            }

            /// Returns a copy of the value at `index`.
            #[must_use]
            pub fn get(&self, index: usize) -> Option<SelectedValue> {
                match self {
                    $( Self::$variant(column) => column.get(index).cloned().map(SelectedValue::$variant), )+
                }
            }

            /// Appends the values of `other`, which must be a column of the
            /// same type; otherwise `other` is handed back untouched.
            pub fn extend(&mut self, other: Self) -> Result<(), Self> {
                match (self, other) {
                    $(
                        (Self::$variant(column), Self::$variant(rest)) => {
                            column.extend(rest);
                            Ok(())
                        }
                    )+
                    (_, other) => Err(other),
                }
            }

            /// Removes the first `n` values (or all of them, if fewer) and
            /// returns them as a column of the same type.
            pub fn split_front(&mut self, n: usize) -> Self {
                match self {
                    $(
                        Self::$variant(column) => {
                            let rest = column.split_off(n.min(column.len()));
                            Self::$variant(std::mem::replace(column, rest))
                        }
                    )+
                }
            }
        }

        $(
            impl SelectedKind for $t {
                fn into_value(self) -> SelectedValue {
                    SelectedValue::$variant(self)
                }

                fn into_batch(items: Vec<Self>) -> QueryOutputBatchBox {
                    QueryOutputBatchBox::$variant(items)
                }

                fn from_batch(batch: QueryOutputBatchBox) -> Result<Vec<Self>, QueryOutputBatchBox> {
                    match batch {
                        QueryOutputBatchBox::$variant(column) => Ok(column),
                        other => Err(other),
                    }
                }

                fn from_value(value: SelectedValue) -> Result<Self, SelectedValue> {
                    match value {
                        SelectedValue::$variant(value) => Ok(value),
                        other => Err(other),
                    }
                }
            }

            impl From<$t> for SelectedValue {
                fn from(value: $t) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

selected_values! {
    Domain(Domain) = 0,
    Account(Account) = 1,
    Asset(Asset) = 2,
    AssetDefinition(AssetDefinition) = 3,
    Role(Role) = 4,
    Permission(Permission) = 6,
    PeerId(PeerId) = 8,
    RoleId(RoleId) = 9,
    BlockHeader(BlockHeader) = 13,
    PublicKey(PublicKey) = 14,
    String(String) = 15,
    Metadata(Metadata) = 16,
    Json(Json) = 17,
    Numeric(Numeric) = 18,
    Name(Name) = 19,
    DomainId(DomainId) = 20,
    AccountId(AccountId) = 21,
    AssetId(AssetId) = 22,
    AssetValue(AssetValue) = 23,
    AssetDefinitionId(AssetDefinitionId) = 24,
    Hash(Hash) = 25,
}

impl QueryOutputBatchBox {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unwraps a column of `T` values.
    pub fn into_typed<T: SelectedKind>(self) -> Result<Vec<T>, Self> {
        T::from_batch(self)
    }
}

/// The columns of one page of query output, in selector order
///
/// Every column holds the same number of values; the `i`th row of the page
/// is the `i`th value of each column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct QueryOutputBatchBoxTuple {
    pub tuple: Vec<QueryOutputBatchBox>,
}

impl QueryOutputBatchBoxTuple {
    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuple.first().map_or(0, QueryOutputBatchBox::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns
    #[must_use]
    pub fn width(&self) -> usize {
        self.tuple.len()
    }

    /// Appends the rows of `other` column by column.
    ///
    /// Fails, leaving `self` untouched, if the column layouts differ.
    pub fn extend(&mut self, other: Self) -> Result<(), Self> {
        if self.tuple.is_empty() {
            *self = other;
            return Ok(());
        }
        let compatible = self.tuple.len() == other.tuple.len()
            && self
                .tuple
                .iter()
                .zip(other.tuple.iter())
                .all(|(ours, theirs)| ours.type_name() == theirs.type_name());
        if !compatible {
            return Err(other);
        }
        for (ours, theirs) in self.tuple.iter_mut().zip(other.tuple) {
            // column types were checked above
            if let Err(theirs) = ours.extend(theirs) {
                return Err(Self { tuple: vec![theirs] });
            }
        }
        Ok(())
    }

    /// Removes the first `n` rows and returns them as a new tuple.
    pub fn split_front(&mut self, n: usize) -> Self {
        Self {
            tuple: self.tuple.iter_mut().map(|column| column.split_front(n)).collect(),
        }
    }

    pub fn into_columns(self) -> Vec<QueryOutputBatchBox> {
        self.tuple
    }
}

impl IntoIterator for QueryOutputBatchBoxTuple {
    type Item = QueryOutputBatchBox;
    type IntoIter = std::vec::IntoIter<QueryOutputBatchBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuple.into_iter()
    }
}
