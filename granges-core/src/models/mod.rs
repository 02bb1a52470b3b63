pub mod column;
pub mod interval;
pub mod store;
pub mod strand;
pub mod table;

// re-export for cleaner imports
pub use self::column::{Categorical, Column, DataType, Value};
pub use self::interval::Interval;
pub use self::store::{CoordinateWidth, RangeStore, StoreOptions};
pub use self::strand::{KeyKind, PartitionKey, Strand};
pub use self::table::{Row, Table};
