use crate::{
    attributes::AttributeTable,
    class_file::{FieldInfo, MethodInfo},
    reader::ByteReader,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, Result,
};

/// Walks a whole class file front to back. The structures it meets are
/// decoded by offset; the parser only keeps track of where the next one
/// starts.
pub struct Parser<'a> {
    r: ByteReader<'a>,
    offset: usize,
}
impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            r: ByteReader::new(bytes),
            offset: 0,
        }
    }

    pub fn parse(mut self) -> Result<ClassFile<'a>> {
        self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;

        let interfaces_count = self.read_u16()?;
        let interfaces = (0..interfaces_count)
            .map(|_| self.read_u16())
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool)?;

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self, constant_pool: &ConstantPool<'a>) -> Result<FieldInfo<'a>> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, constant_pool: &ConstantPool<'a>) -> Result<MethodInfo<'a>> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            0xCAFEBABE => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool<'a>> {
        let constant_pool = ConstantPool::parse(self.r.bytes(), self.offset)?;
        self.offset = constant_pool.table().end_offset();
        Ok(constant_pool)
    }

    fn parse_attributes(&mut self, constant_pool: &ConstantPool<'a>) -> Result<AttributeTable<'a>> {
        let (attributes, size) = AttributeTable::decode(constant_pool, self.offset)?;
        self.offset += size;
        Ok(attributes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let value = self.r.u4(0, self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let value = self.r.u2(0, self.offset)?;
        self.offset += 2;
        Ok(value)
    }
}
