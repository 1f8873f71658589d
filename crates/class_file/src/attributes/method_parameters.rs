use std::borrow::Cow;

use crate::{AccessFlags, ConstantPool, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter<'a> {
    pub name_index: u16,
    /// `None` when the compiler recorded the parameter without a name.
    pub name: Option<Cow<'a, str>>,
    pub access_flags: AccessFlags,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodParametersAttribute<'a> {
    pub parameters: Vec<MethodParameter<'a>>,
}
impl<'a> MethodParametersAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();
        let count = r.u1(0, offset)? as usize;
        let parameters = (0..count)
            .map(|i| -> Result<MethodParameter<'a>> {
                let base = offset + 1 + i * 4;
                let name_index = r.u2(0, base)?;
                Ok(MethodParameter {
                    name_index,
                    name: constant_pool.optional_utf8(name_index)?,
                    access_flags: AccessFlags::from_bits_truncate(r.u2(2, base)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { parameters })
    }

    pub fn size_in_bytes(&self) -> usize {
        1 + self.parameters.len() * 4
    }

    pub fn names(&self) -> Vec<Option<Cow<'a, str>>> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }
}
