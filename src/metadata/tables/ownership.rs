//! Ownership ranges across tables.
//!
//! Fields, methods, parameters, properties and events have no column naming their owner. The
//! owner stores the first RID of its run instead, and the run ends where the next owner's run
//! begins. When a `*Ptr` table is present the runs index that table, whose rows name the real
//! child RIDs.

use crate::{
    metadata::{
        tables::{MetadataTables, TableId},
        token::Token,
    },
    Result,
};

impl MetadataTables {
    /// `Field` RIDs owned by `TypeDef` row `type_rid`, in declaration order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for overlapping runs.
    pub fn type_fields(&self, type_rid: u32) -> Result<Vec<u32>> {
        let count = if self.fieldptr.is_empty() {
            self.field.row_count()
        } else {
            self.fieldptr.row_count()
        };

        Ok(self
            .typedef
            .owned_range(type_rid, count, |row| row.field_list)?
            .map(|index| self.fieldptr.get(index).map_or(index, |ptr| ptr.field))
            .collect())
    }

    /// `MethodDef` RIDs owned by `TypeDef` row `type_rid`, in declaration order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for overlapping runs.
    pub fn type_methods(&self, type_rid: u32) -> Result<Vec<u32>> {
        let count = if self.methodptr.is_empty() {
            self.methoddef.row_count()
        } else {
            self.methodptr.row_count()
        };

        Ok(self
            .typedef
            .owned_range(type_rid, count, |row| row.method_list)?
            .map(|index| self.methodptr.get(index).map_or(index, |ptr| ptr.method))
            .collect())
    }

    /// `Param` RIDs owned by `MethodDef` row `method_rid`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for overlapping runs.
    pub fn method_params(&self, method_rid: u32) -> Result<Vec<u32>> {
        Ok(self
            .methoddef
            .owned_range(method_rid, self.param.row_count(), |row| row.param_list)?
            .collect())
    }

    /// `Property` RIDs owned by `TypeDef` row `type_rid` through its `PropertyMap` row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for overlapping runs.
    pub fn type_properties(&self, type_rid: u32) -> Result<Vec<u32>> {
        let key = Token::from_parts(TableId::TypeDef, type_rid);
        let Some(&map_rid) = self.propertymap.find_all_indexed(key).first() else {
            return Ok(Vec::new());
        };

        let count = if self.propertyptr.is_empty() {
            self.property.row_count()
        } else {
            self.propertyptr.row_count()
        };

        Ok(self
            .propertymap
            .owned_range(map_rid, count, |row| row.property_list)?
            .map(|index| {
                self.propertyptr
                    .get(index)
                    .map_or(index, |ptr| ptr.property)
            })
            .collect())
    }

    /// `Event` RIDs owned by `TypeDef` row `type_rid` through its `EventMap` row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for overlapping runs.
    pub fn type_events(&self, type_rid: u32) -> Result<Vec<u32>> {
        let key = Token::from_parts(TableId::TypeDef, type_rid);
        let Some(&map_rid) = self.eventmap.find_all_indexed(key).first() else {
            return Ok(Vec::new());
        };

        let count = if self.eventptr.is_empty() {
            self.event.row_count()
        } else {
            self.eventptr.row_count()
        };

        Ok(self
            .eventmap
            .owned_range(map_rid, count, |row| row.event_list)?
            .map(|index| self.eventptr.get(index).map_or(index, |ptr| ptr.event))
            .collect())
    }

    /// The `TypeDef` row owning `Field` row `field_rid`.
    #[must_use]
    pub fn field_owner(&self, field_rid: u32) -> Option<u32> {
        let index = if self.fieldptr.is_empty() {
            field_rid
        } else {
            self.fieldptr
                .iter()
                .position(|ptr| ptr.field == field_rid)? as u32
                + 1
        };

        self.typedef.find_owner(index, |row| row.field_list)
    }

    /// The `TypeDef` row owning `MethodDef` row `method_rid`.
    #[must_use]
    pub fn method_owner(&self, method_rid: u32) -> Option<u32> {
        let index = if self.methodptr.is_empty() {
            method_rid
        } else {
            self.methodptr
                .iter()
                .position(|ptr| ptr.method == method_rid)? as u32
                + 1
        };

        self.typedef.find_owner(index, |row| row.method_list)
    }

    /// The `MethodDef` row owning `Param` row `param_rid`.
    #[must_use]
    pub fn param_owner(&self, param_rid: u32) -> Option<u32> {
        self.methoddef.find_owner(param_rid, |row| row.param_list)
    }

    /// The `TypeDef` row owning `Property` row `property_rid`.
    #[must_use]
    pub fn property_owner(&self, property_rid: u32) -> Option<u32> {
        let index = if self.propertyptr.is_empty() {
            property_rid
        } else {
            self.propertyptr
                .iter()
                .position(|ptr| ptr.property == property_rid)? as u32
                + 1
        };

        let map_rid = self.propertymap.find_owner(index, |row| row.property_list)?;
        self.propertymap.get(map_rid).map(|row| row.parent)
    }

    /// The `TypeDef` row owning `Event` row `event_rid`.
    #[must_use]
    pub fn event_owner(&self, event_rid: u32) -> Option<u32> {
        let index = if self.eventptr.is_empty() {
            event_rid
        } else {
            self.eventptr.iter().position(|ptr| ptr.event == event_rid)? as u32 + 1
        };

        let map_rid = self.eventmap.find_owner(index, |row| row.event_list)?;
        self.eventmap.get(map_rid).map(|row| row.parent)
    }

    /// The `TypeDef` row enclosing nested type `type_rid`, if it is nested.
    #[must_use]
    pub fn enclosing_type(&self, type_rid: u32) -> Option<u32> {
        self.nestedclass
            .find_all_indexed(Token::from_parts(TableId::TypeDef, type_rid))
            .first()
            .and_then(|rid| self.nestedclass.get(*rid))
            .map(|row| row.enclosing_class)
    }

    /// `TypeDef` rows directly nested in `type_rid`, in `NestedClass` order.
    #[must_use]
    pub fn nested_types(&self, type_rid: u32) -> Vec<u32> {
        self.nestedclass
            .iter()
            .filter(|row| row.enclosing_class == type_rid)
            .map(|row| row.nested_class)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        metadata::{
            tables::{CodedIndexType, MetadataTables, TableId},
            token::Token,
        },
        test::builder::{Col, ImageBuilder},
        Error,
    };

    fn type_row(builder: &mut ImageBuilder, name: &str, fields: u32, methods: u32) {
        builder.row(
            TableId::TypeDef,
            &[
                Col::U32(0),
                Col::Str(name),
                Col::Str("N"),
                Col::Coded(CodedIndexType::TypeDefOrRef, Token::new(0)),
                Col::Index(fields),
                Col::Index(methods),
            ],
        );
    }

    fn field_row(builder: &mut ImageBuilder, name: &str) {
        builder.row(
            TableId::Field,
            &[Col::U16(0x6), Col::Str(name), Col::Blob(&[0x06, 0x08])],
        );
    }

    fn read(builder: &ImageBuilder) -> MetadataTables {
        MetadataTables::read(&builder.tables_stream(), u32::MAX).unwrap()
    }

    #[test]
    fn empty_owner_is_skipped() {
        let mut builder = ImageBuilder::new();
        type_row(&mut builder, "<Module>", 1, 1);
        type_row(&mut builder, "Empty", 1, 1);
        type_row(&mut builder, "Full", 1, 1);
        type_row(&mut builder, "Tail", 3, 1);
        for name in ["a", "b", "c", "d"] {
            field_row(&mut builder, name);
        }

        let tables = read(&builder);
        assert!(tables.type_fields(1).unwrap().is_empty());
        assert!(tables.type_fields(2).unwrap().is_empty());
        assert_eq!(tables.type_fields(3).unwrap(), vec![1, 2]);
        assert_eq!(tables.type_fields(4).unwrap(), vec![3, 4]);

        assert_eq!(tables.field_owner(1), Some(3));
        assert_eq!(tables.field_owner(2), Some(3));
        assert_eq!(tables.field_owner(4), Some(4));
        assert!(tables.type_methods(4).unwrap().is_empty());
    }

    #[test]
    fn overlapping_field_runs_are_malformed() {
        let mut builder = ImageBuilder::new();
        type_row(&mut builder, "<Module>", 1, 1);
        type_row(&mut builder, "A", 3, 1);
        type_row(&mut builder, "B", 2, 1);
        for name in ["a", "b", "c"] {
            field_row(&mut builder, name);
        }

        let tables = read(&builder);
        assert_eq!(tables.type_fields(1).unwrap(), vec![1, 2]);
        assert!(matches!(tables.type_fields(2), Err(Error::Malformed { .. })));
        assert!(matches!(tables.type_fields(3), Err(Error::Malformed { .. })));
    }

    #[test]
    fn field_ptr_indirection() {
        let mut builder = ImageBuilder::new();
        type_row(&mut builder, "<Module>", 1, 1);
        type_row(&mut builder, "A", 1, 1);
        type_row(&mut builder, "B", 2, 1);
        for name in ["x", "y", "z"] {
            field_row(&mut builder, name);
        }
        for field in [3, 1, 2] {
            builder.row(TableId::FieldPtr, &[Col::Index(field)]);
        }

        let tables = read(&builder);
        assert_eq!(tables.type_fields(2).unwrap(), vec![3]);
        assert_eq!(tables.type_fields(3).unwrap(), vec![1, 2]);
        assert_eq!(tables.field_owner(3), Some(2));
        assert_eq!(tables.field_owner(1), Some(3));
    }

    #[test]
    fn property_map_ranges() {
        let mut builder = ImageBuilder::new();
        type_row(&mut builder, "<Module>", 1, 1);
        type_row(&mut builder, "A", 1, 1);
        type_row(&mut builder, "B", 1, 1);
        for name in ["P", "Q", "R"] {
            builder.row(
                TableId::Property,
                &[Col::U16(0), Col::Str(name), Col::Blob(&[0x08, 0x00, 0x08])],
            );
        }
        builder.row(TableId::PropertyMap, &[Col::Index(2), Col::Index(1)]);
        builder.row(TableId::PropertyMap, &[Col::Index(3), Col::Index(2)]);

        let tables = read(&builder);
        assert_eq!(tables.type_properties(2).unwrap(), vec![1]);
        assert_eq!(tables.type_properties(3).unwrap(), vec![2, 3]);
        assert!(tables.type_properties(1).unwrap().is_empty());
        assert_eq!(tables.property_owner(3), Some(3));
        assert_eq!(tables.property_owner(1), Some(2));
    }

    #[test]
    fn nesting() {
        let mut builder = ImageBuilder::new();
        type_row(&mut builder, "<Module>", 1, 1);
        type_row(&mut builder, "Outer", 1, 1);
        type_row(&mut builder, "Inner", 1, 1);
        builder.row(TableId::NestedClass, &[Col::Index(3), Col::Index(2)]);

        let tables = read(&builder);
        assert_eq!(tables.enclosing_type(3), Some(2));
        assert_eq!(tables.enclosing_type(2), None);
        assert_eq!(tables.nested_types(2), vec![3]);
    }
}
