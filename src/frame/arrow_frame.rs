//! In-process frame backed by a single Arrow record batch

use super::{non_null_mask, Frame, NullCount};
use crate::schema::ColumnMapping;
use crate::{Error, Result};

use arrow::compute::{concat_batches, filter_record_batch, sort_to_indices, take};
use arrow::row::{RowConverter, SortField};
use arrow_array::{Array, ArrayRef, BooleanArray, RecordBatch, RecordBatchOptions};
use arrow_schema::{Field, FieldRef, Schema, SchemaRef};
use std::collections::HashSet;
use std::sync::Arc;

/// Dataset held in memory as one Arrow record batch
#[derive(Debug, Clone)]
pub struct ArrowFrame {
    batch: RecordBatch,
}

impl ArrowFrame {
    /// Wrap a batch, rejecting duplicate column names
    pub fn try_new(batch: RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let mut names = HashSet::with_capacity(schema.fields().len());
        for field in schema.fields() {
            if !names.insert(field.name().as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name '{}'",
                    field.name()
                )));
            }
        }
        Ok(Self { batch })
    }

    /// Concatenate batches sharing `schema` into one frame
    pub fn try_from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let combined = concat_batches(&schema, batches)?;
        Self::try_new(combined)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.batch
            .schema()
            .index_of(name)
            .map_err(|_| Error::MissingColumn(name.to_string()))
    }

    /// Build a frame with the same row count from new fields and columns
    fn with_parts(&self, fields: Vec<FieldRef>, columns: Vec<ArrayRef>) -> Result<Self> {
        let schema = Arc::new(Schema::new(fields));
        let options = RecordBatchOptions::new().with_row_count(Some(self.batch.num_rows()));
        let batch = RecordBatch::try_new_with_options(schema, columns, &options)?;
        Self::try_new(batch)
    }
}

impl Frame for ArrowFrame {
    fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    fn column(&self, name: &str) -> Result<ArrayRef> {
        let index = self.column_index(name)?;
        Ok(self.batch.column(index).clone())
    }

    fn filter(&self, mask: &BooleanArray) -> Result<Self> {
        Ok(Self {
            batch: filter_record_batch(&self.batch, mask)?,
        })
    }

    fn drop_duplicates(&self, subset: Option<&[&str]>) -> Result<Self> {
        let indices: Vec<usize> = match subset {
            Some(names) if !names.is_empty() => names
                .iter()
                .map(|name| self.column_index(name))
                .collect::<Result<_>>()?,
            _ => (0..self.batch.num_columns()).collect(),
        };

        if self.batch.num_rows() < 2 || indices.is_empty() {
            return Ok(self.clone());
        }

        let keys: Vec<ArrayRef> = indices
            .iter()
            .map(|i| self.batch.column(*i).clone())
            .collect();
        let sort_fields = keys
            .iter()
            .map(|k| SortField::new(k.data_type().clone()))
            .collect();
        let converter = RowConverter::new(sort_fields)?;
        let rows = converter.convert_columns(&keys)?;

        let mut seen = HashSet::with_capacity(rows.num_rows());
        let keep: Vec<bool> = rows.iter().map(|row| seen.insert(row)).collect();

        if keep.iter().all(|k| *k) {
            return Ok(self.clone());
        }

        self.filter(&BooleanArray::from(keep))
    }

    fn null_counts(&self) -> Result<Vec<NullCount>> {
        let schema = self.batch.schema();
        schema
            .fields()
            .iter()
            .zip(self.batch.columns())
            .map(|(field, column)| {
                let present = non_null_mask(column.as_ref())?;
                Ok(NullCount {
                    column: field.name().clone(),
                    nulls: present.len() - present.true_count(),
                })
            })
            .collect()
    }

    fn project(&self, columns: &[ColumnMapping]) -> Result<Self> {
        let schema = self.batch.schema();
        let mut targets = HashSet::with_capacity(columns.len());
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());

        for mapping in columns {
            if !targets.insert(mapping.target) {
                return Err(Error::InvalidSchema(format!(
                    "projection produces column '{}' twice",
                    mapping.target
                )));
            }
            let index = self.column_index(mapping.source)?;
            let field = schema.field(index).clone().with_name(mapping.target);
            fields.push(Arc::new(field));
            arrays.push(self.batch.column(index).clone());
        }

        self.with_parts(fields, arrays)
    }

    fn with_column(&self, name: &str, values: ArrayRef) -> Result<Self> {
        if values.len() != self.batch.num_rows() {
            return Err(Error::InvalidSchema(format!(
                "column '{}' has {} values, frame has {} rows",
                name,
                values.len(),
                self.batch.num_rows()
            )));
        }

        let schema = self.batch.schema();
        let field: FieldRef = Arc::new(Field::new(name, values.data_type().clone(), true));
        let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
        let mut columns = self.batch.columns().to_vec();

        match schema.index_of(name) {
            Ok(index) => {
                fields[index] = field;
                columns[index] = values;
            }
            Err(_) => {
                fields.push(field);
                columns.push(values);
            }
        }

        self.with_parts(fields, columns)
    }

    fn drop_columns(&self, names: &[&str]) -> Result<Self> {
        let schema = self.batch.schema();
        let (fields, columns): (Vec<FieldRef>, Vec<ArrayRef>) = schema
            .fields()
            .iter()
            .zip(self.batch.columns())
            .filter(|(field, _)| !names.contains(&field.name().as_str()))
            .map(|(field, column)| (field.clone(), column.clone()))
            .unzip();

        self.with_parts(fields, columns)
    }

    fn sort_by(&self, column: &str) -> Result<Self> {
        let key = self.column(column)?;
        let indices = sort_to_indices(key.as_ref(), None, None)?;

        let sorted_columns: Vec<ArrayRef> = self
            .batch
            .columns()
            .iter()
            .map(|col| take(col.as_ref(), &indices, None))
            .collect::<std::result::Result<_, _>>()?;

        Ok(Self {
            batch: RecordBatch::try_new(self.batch.schema(), sorted_columns)?,
        })
    }

    fn batches(&self) -> Vec<RecordBatch> {
        vec![self.batch.clone()]
    }
}
