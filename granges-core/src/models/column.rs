use std::cmp::Ordering;
use std::fmt::{self, Display};

use fxhash::{FxHashMap, FxHashSet};

use crate::errors::{RangesError, Result};
use crate::models::CoordinateWidth;
use crate::utils::natural_sort;

/// The physical type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Categorical,
    Int32,
    Int64,
    Float64,
    Utf8,
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Categorical => "categorical",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
        };
        write!(f, "{}", name)
    }
}

/// A single borrowed cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl<'a> Value<'a> {
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    /// Total order over cells: numbers before strings, numbers compared by value.
    pub fn total_cmp(&self, other: &Value<'_>) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Str(_), _) => Ordering::Greater,
            (_, Value::Str(_)) => Ordering::Less,
            (a, b) => {
                // both numeric, at least one float
                let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                a.total_cmp(&b)
            }
        }
    }
}

impl Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

///
/// Dictionary-encoded strings: every row stores a code into `categories`.
///
#[derive(Debug, Clone, Default)]
pub struct Categorical {
    codes: Vec<u32>,
    categories: Vec<String>,
}

impl Categorical {
    ///
    /// Encode a list of strings. Categories are the distinct values in natural order.
    ///
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<S> = values.into_iter().collect();

        let distinct: FxHashSet<&str> = values.iter().map(|v| v.as_ref()).collect();
        let mut categories: Vec<&str> = distinct.into_iter().collect();
        natural_sort(&mut categories);

        let lookup: FxHashMap<&str, u32> = categories
            .iter()
            .enumerate()
            .map(|(code, cat)| (*cat, code as u32))
            .collect();

        let codes = values.iter().map(|v| lookup[v.as_ref()]).collect();

        Categorical {
            codes,
            categories: categories.into_iter().map(String::from).collect(),
        }
    }

    ///
    /// Build from raw codes and a category list. Fails if a code points past
    /// the end of `categories`.
    ///
    pub fn new(codes: Vec<u32>, categories: Vec<String>) -> Result<Self> {
        if let Some(bad) = codes.iter().find(|&&c| c as usize >= categories.len()) {
            return Err(RangesError::schema(format!(
                "categorical code {} out of range for {} categories",
                bad,
                categories.len()
            )));
        }
        Ok(Categorical { codes, categories })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    pub fn get(&self, i: usize) -> &str {
        &self.categories[self.codes[i] as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(|&c| self.categories[c as usize].as_str())
    }

    /// Whether every declared category occurs in the data.
    pub fn is_tight(&self) -> bool {
        let mut used = vec![false; self.categories.len()];
        for &c in &self.codes {
            used[c as usize] = true;
        }
        used.into_iter().all(|u| u)
    }

    ///
    /// Drop categories that no row uses and re-code the remaining ones.
    ///
    pub fn remove_unused_categories(self) -> Self {
        let mut remap: Vec<Option<u32>> = vec![None; self.categories.len()];
        for &c in &self.codes {
            remap[c as usize] = Some(0);
        }

        let mut categories = Vec::new();
        for (old, cat) in self.categories.into_iter().enumerate() {
            if remap[old].is_some() {
                remap[old] = Some(categories.len() as u32);
                categories.push(cat);
            }
        }

        let codes = self
            .codes
            .into_iter()
            .map(|c| remap[c as usize].unwrap_or_default())
            .collect();

        Categorical { codes, categories }
    }

    fn take(&self, indices: &[usize]) -> Self {
        Categorical {
            codes: indices.iter().map(|&i| self.codes[i]).collect(),
            categories: self.categories.clone(),
        }
    }

    fn concat(parts: &[&Categorical]) -> Self {
        let mut categories: Vec<&str> = parts
            .iter()
            .flat_map(|p| p.categories.iter().map(String::as_str))
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        natural_sort(&mut categories);

        let lookup: FxHashMap<&str, u32> = categories
            .iter()
            .enumerate()
            .map(|(code, cat)| (*cat, code as u32))
            .collect();

        let codes = parts
            .iter()
            .flat_map(|p| p.iter().map(|v| lookup[v]))
            .collect();

        Categorical {
            codes,
            categories: categories.into_iter().map(String::from).collect(),
        }
    }
}

///
/// One typed column of a [`Table`](crate::models::Table).
///
#[derive(Debug, Clone)]
pub enum Column {
    Categorical(Categorical),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
}

impl Column {
    /// Build a categorical column from strings.
    pub fn categorical<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Column::Categorical(Categorical::from_values(values))
    }

    /// Build a string column.
    pub fn utf8<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column::Utf8(values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(c) => c.len(),
            Column::Int32(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DataType {
        match self {
            Column::Categorical(_) => DataType::Categorical,
            Column::Int32(_) => DataType::Int32,
            Column::Int64(_) => DataType::Int64,
            Column::Float64(_) => DataType::Float64,
            Column::Utf8(_) => DataType::Utf8,
        }
    }

    pub fn get(&self, i: usize) -> Value<'_> {
        match self {
            Column::Categorical(c) => Value::Str(c.get(i)),
            Column::Int32(v) => Value::Int(v[i] as i64),
            Column::Int64(v) => Value::Int(v[i]),
            Column::Float64(v) => Value::Float(v[i]),
            Column::Utf8(v) => Value::Str(&v[i]),
        }
    }

    pub fn as_categorical(&self) -> Option<&Categorical> {
        match self {
            Column::Categorical(c) => Some(c),
            _ => None,
        }
    }

    /// Iterate a string-like column (categorical or utf8).
    pub fn iter_str(&self) -> Option<Box<dyn Iterator<Item = &str> + '_>> {
        match self {
            Column::Categorical(c) => Some(Box::new(c.iter())),
            Column::Utf8(v) => Some(Box::new(v.iter().map(String::as_str))),
            _ => None,
        }
    }

    /// Distinct values of a string-like column, in natural order.
    pub fn distinct_str(&self) -> Option<Vec<&str>> {
        let mut values: Vec<&str> = self
            .iter_str()?
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        natural_sort(&mut values);
        Some(values)
    }

    /// Integer columns widened to `i64`; `None` for any other type.
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        match self {
            Column::Int32(v) => Some(v.iter().map(|&x| x as i64).collect()),
            Column::Int64(v) => Some(v.clone()),
            _ => None,
        }
    }

    ///
    /// Store integer coordinates with the given width.
    ///
    /// Fails with [`RangesError::CoordinateOverflow`] if a value does not fit 32 bits
    /// in a narrow store.
    ///
    pub fn from_coordinates(values: Vec<i64>, width: CoordinateWidth) -> Result<Column> {
        match width {
            CoordinateWidth::Int64 => Ok(Column::Int64(values)),
            CoordinateWidth::Int32 => values
                .into_iter()
                .map(|v| i32::try_from(v).map_err(|_| RangesError::CoordinateOverflow(v)))
                .collect::<Result<Vec<i32>>>()
                .map(Column::Int32),
        }
    }

    ///
    /// Cast an integer column to the store coordinate width.
    ///
    pub fn cast_coordinates(self, width: CoordinateWidth) -> Result<Column> {
        match (self, width) {
            (Column::Int32(v), CoordinateWidth::Int32) => Ok(Column::Int32(v)),
            (Column::Int64(v), CoordinateWidth::Int64) => Ok(Column::Int64(v)),
            (Column::Int32(v), CoordinateWidth::Int64) => {
                Ok(Column::Int64(v.into_iter().map(i64::from).collect()))
            }
            (Column::Int64(v), CoordinateWidth::Int32) => Column::from_coordinates(v, width),
            (other, _) => Err(RangesError::schema(format!(
                "coordinate columns must be integers, found {}",
                other.dtype()
            ))),
        }
    }

    ///
    /// Encode a string-like or integer column as categorical. Integer values
    /// are stringified, so a chromosome column read as `1, 2, ...` still works.
    ///
    pub fn into_categorical(self) -> Result<Categorical> {
        match self {
            Column::Categorical(c) => Ok(c),
            Column::Utf8(v) => Ok(Categorical::from_values(v)),
            Column::Int32(v) => Ok(Categorical::from_values(v.iter().map(|x| x.to_string()))),
            Column::Int64(v) => Ok(Categorical::from_values(v.iter().map(|x| x.to_string()))),
            Column::Float64(_) => Err(RangesError::schema(
                "cannot encode a float column as categorical",
            )),
        }
    }

    /// Gather rows by index; indices may repeat.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Categorical(c) => Column::Categorical(c.take(indices)),
            Column::Int32(v) => Column::Int32(indices.iter().map(|&i| v[i]).collect()),
            Column::Int64(v) => Column::Int64(indices.iter().map(|&i| v[i]).collect()),
            Column::Float64(v) => Column::Float64(indices.iter().map(|&i| v[i]).collect()),
            Column::Utf8(v) => Column::Utf8(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    ///
    /// Concatenate columns of one type. Categorical parts get a unioned category list.
    ///
    pub fn concat(parts: &[&Column]) -> Result<Column> {
        let Some(first) = parts.first() else {
            return Err(RangesError::schema("cannot concatenate zero columns"));
        };
        let dtype = first.dtype();
        if let Some(other) = parts.iter().find(|p| p.dtype() != dtype) {
            return Err(RangesError::schema(format!(
                "cannot concatenate {} column with {} column",
                dtype,
                other.dtype()
            )));
        }

        let column = match dtype {
            DataType::Categorical => Column::Categorical(Categorical::concat(
                &parts.iter().filter_map(|p| p.as_categorical()).collect::<Vec<_>>(),
            )),
            DataType::Int32 => {
                let mut out = Vec::new();
                for p in parts {
                    if let Column::Int32(v) = p {
                        out.extend_from_slice(v);
                    }
                }
                Column::Int32(out)
            }
            DataType::Int64 => {
                let mut out = Vec::new();
                for p in parts {
                    if let Column::Int64(v) = p {
                        out.extend_from_slice(v);
                    }
                }
                Column::Int64(out)
            }
            DataType::Float64 => {
                let mut out = Vec::new();
                for p in parts {
                    if let Column::Float64(v) = p {
                        out.extend_from_slice(v);
                    }
                }
                Column::Float64(out)
            }
            DataType::Utf8 => {
                let mut out = Vec::new();
                for p in parts {
                    if let Column::Utf8(v) = p {
                        out.extend(v.iter().cloned());
                    }
                }
                Column::Utf8(out)
            }
        };
        Ok(column)
    }

    /// Compare two rows of this column.
    pub fn cmp_rows(&self, i: usize, j: usize) -> Ordering {
        match self {
            Column::Categorical(c) => c.get(i).cmp(c.get(j)),
            Column::Int32(v) => v[i].cmp(&v[j]),
            Column::Int64(v) => v[i].cmp(&v[j]),
            Column::Float64(v) => v[i].total_cmp(&v[j]),
            Column::Utf8(v) => v[i].cmp(&v[j]),
        }
    }

    /// Drop unused categories; other columns are returned unchanged.
    pub fn tighten(self) -> Column {
        match self {
            Column::Categorical(c) => Column::Categorical(c.remove_unused_categories()),
            other => other,
        }
    }
}

impl PartialEq for Column {
    /// Columns compare by type and value; categorical columns by decoded strings.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Column::Categorical(a), Column::Categorical(b)) => {
                a.len() == b.len() && a.iter().eq(b.iter())
            }
            (Column::Int32(a), Column::Int32(b)) => a == b,
            (Column::Int64(a), Column::Int64(b)) => a == b,
            (Column::Float64(a), Column::Float64(b)) => a == b,
            (Column::Utf8(a), Column::Utf8(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_categorical_natural_categories() {
        let cat = Categorical::from_values(["chr10", "chr2", "chr10", "chr1"]);
        assert_eq!(cat.categories(), &["chr1", "chr2", "chr10"]);
        assert_eq!(cat.iter().collect::<Vec<_>>(), vec!["chr10", "chr2", "chr10", "chr1"]);
        assert!(cat.is_tight());
    }

    #[rstest]
    fn test_remove_unused_categories() {
        let cat = Categorical::from_values(["chr1", "chr2", "chr3"]).take(&[2, 0, 2]);
        assert!(!cat.is_tight());

        let cat = cat.remove_unused_categories();
        assert!(cat.is_tight());
        assert_eq!(cat.categories(), &["chr1", "chr3"]);
        assert_eq!(cat.iter().collect::<Vec<_>>(), vec!["chr3", "chr1", "chr3"]);
    }

    #[rstest]
    fn test_categorical_codes_are_validated() {
        assert!(Categorical::new(vec![0, 2], vec!["a".into(), "b".into()]).is_err());
        assert!(Categorical::new(vec![0, 1], vec!["a".into(), "b".into()]).is_ok());
    }

    #[rstest]
    fn test_concat_unions_categories() {
        let a = Column::categorical(["+", "+"]);
        let b = Column::categorical(["-"]);
        let joined = Column::concat(&[&a, &b]).unwrap();

        let cat = joined.as_categorical().unwrap();
        assert_eq!(cat.categories(), &["+", "-"]);
        assert_eq!(joined, Column::categorical(["+", "+", "-"]));
    }

    #[rstest]
    fn test_concat_rejects_mixed_types() {
        let a = Column::Int32(vec![1]);
        let b = Column::Int64(vec![1]);
        assert!(matches!(
            Column::concat(&[&a, &b]),
            Err(RangesError::SchemaViolation(_))
        ));
    }

    #[rstest]
    #[case(CoordinateWidth::Int32, DataType::Int32)]
    #[case(CoordinateWidth::Int64, DataType::Int64)]
    fn test_cast_coordinates(#[case] width: CoordinateWidth, #[case] expected: DataType) {
        let col = Column::Int64(vec![0, 5, 10]).cast_coordinates(width).unwrap();
        assert_eq!(col.dtype(), expected);
        assert_eq!(col.to_i64_vec().unwrap(), vec![0, 5, 10]);
    }

    #[rstest]
    fn test_cast_coordinates_overflow() {
        let col = Column::Int64(vec![0, i64::from(i32::MAX) + 1]);
        assert!(matches!(
            col.cast_coordinates(CoordinateWidth::Int32),
            Err(RangesError::CoordinateOverflow(_))
        ));
    }

    #[rstest]
    fn test_cast_coordinates_rejects_strings() {
        let col = Column::utf8(["1", "2"]);
        assert!(col.cast_coordinates(CoordinateWidth::Int64).is_err());
    }

    #[rstest]
    fn test_integer_chromosomes_become_categorical() {
        let cat = Column::Int64(vec![10, 2, 2]).into_categorical().unwrap();
        assert_eq!(cat.categories(), &["2", "10"]);
    }

    #[rstest]
    fn test_value_ordering() {
        assert_eq!(Value::Int(2).total_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Str("a").total_cmp(&Value::Int(9)), Ordering::Greater);
    }
}
