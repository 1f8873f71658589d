use std::{borrow::Cow, fmt};

use jdis_class_file::attributes::LocalVariableAttribute;

/// Name shown for slot 0 of instance methods when nothing better is known.
pub const RECEIVER_NAME: &str = "this";

/// Names local variable slots from a method's debug information.
///
/// A `LocalVariableTable` entry live at the instruction wins; otherwise slot 0
/// of an instance method is the receiver, and the remaining slots are matched
/// against the parameters by accumulating their widths.
#[derive(Debug, Clone, Copy)]
pub struct LocalNameResolver<'r, 'a> {
    pub local_variables: Option<&'r LocalVariableAttribute<'a>>,
    pub parameter_names: Option<&'r [Option<Cow<'a, str>>]>,
    pub parameter_slot_widths: &'r [u8],
    pub is_static: bool,
}
impl<'r, 'a> LocalNameResolver<'r, 'a> {
    pub fn resolve(&self, pc: u32, slot: u16, show_index: bool) -> LocalName<'r> {
        let shown_slot = show_index.then_some(slot);

        let from_table = self
            .local_variables
            .and_then(|table| table.find(slot, effective_pc(pc, slot)))
            .map(|entry| entry.name.as_ref());

        let name = from_table.or_else(|| {
            if slot == 0 && !self.is_static {
                Some(RECEIVER_NAME)
            } else {
                self.parameter_at(slot)
            }
        });

        LocalName {
            slot: shown_slot,
            name,
        }
    }

    fn parameter_at(&self, slot: u16) -> Option<&'r str> {
        let names = self.parameter_names?;

        let mut offset = if self.is_static { 0u32 } else { 1 };
        for (position, width) in self.parameter_slot_widths.iter().enumerate() {
            if offset == slot as u32 {
                return names.get(position)?.as_deref();
            }
            if offset > slot as u32 {
                break;
            }
            offset += *width as u32;
        }

        None
    }
}

/// The first pc at which a store to `slot` is visible: the instruction
/// length depends on how the slot had to be encoded.
fn effective_pc(pc: u32, slot: u16) -> usize {
    let length = match slot {
        0..=3 => 1,
        4..=255 => 2,
        _ => 3,
    };

    pc as usize + length
}

/// The local variable part of an instruction line; empty when there is
/// nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalName<'r> {
    pub slot: Option<u16>,
    pub name: Option<&'r str>,
}
impl fmt::Display for LocalName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.slot, self.name) {
            (Some(slot), Some(name)) => write!(f, " {slot} [{name}]"),
            (None, Some(name)) => write!(f, " [{name}]"),
            (Some(slot), None) => write!(f, " {slot}"),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod local_name_resolver_tests {
    use super::*;
    use jdis_class_file::attributes::LocalVariableEntry;

    fn entry(
        start_pc: u16,
        length: u16,
        index: u16,
        name: &'static str,
    ) -> LocalVariableEntry<'static> {
        LocalVariableEntry {
            start_pc,
            length,
            index,
            name: name.into(),
            descriptor: "I".into(),
        }
    }

    fn resolver<'r>(
        local_variables: Option<&'r LocalVariableAttribute<'static>>,
        parameter_names: Option<&'r [Option<Cow<'static, str>>]>,
        parameter_slot_widths: &'r [u8],
        is_static: bool,
    ) -> LocalNameResolver<'r, 'static> {
        LocalNameResolver {
            local_variables,
            parameter_names,
            parameter_slot_widths,
            is_static,
        }
    }

    #[test]
    fn it_should_name_the_receiver_without_a_table() {
        let r = resolver(None, None, &[], false);

        assert_eq!(r.resolve(0, 0, false).to_string(), " [this]");
        assert_eq!(r.resolve(0, 0, true).to_string(), " 0 [this]");
    }

    #[test]
    fn it_should_not_name_slot_0_of_static_methods() {
        let r = resolver(None, None, &[], true);

        assert_eq!(r.resolve(0, 0, false).to_string(), "");
        assert_eq!(r.resolve(0, 0, true).to_string(), " 0");
    }

    #[test]
    fn it_should_prefer_the_local_variable_table() {
        let table = LocalVariableAttribute {
            entries: vec![entry(0, 10, 1, "count")],
        };
        let names = [Some(Cow::Borrowed("param"))];
        let r = resolver(Some(&table), Some(&names), &[1], false);

        assert_eq!(
            r.resolve(3, 1, false),
            LocalName {
                slot: None,
                name: Some("count")
            }
        );
    }

    #[test]
    fn it_should_look_past_the_instruction_being_rendered() {
        // istore_1 at pc 9 is visible from pc 10, past the end of the range
        let table = LocalVariableAttribute {
            entries: vec![entry(0, 10, 1, "count")],
        };
        let r = resolver(Some(&table), None, &[], true);

        assert_eq!(r.resolve(8, 1, false).name, Some("count"));
        assert_eq!(r.resolve(9, 1, false).name, None);
    }

    #[test]
    fn it_should_fall_back_to_parameter_names() {
        // (long, int) on an instance method: slots 1-2 and 3
        let table = LocalVariableAttribute { entries: vec![] };
        let names = [Some(Cow::Borrowed("big")), Some(Cow::Borrowed("small"))];
        let r = resolver(Some(&table), Some(&names), &[2, 1], false);

        assert_eq!(r.resolve(0, 1, true).to_string(), " 1 [big]");
        assert_eq!(r.resolve(0, 2, true).to_string(), " 2");
        assert_eq!(r.resolve(0, 3, false).to_string(), " [small]");
        assert_eq!(r.resolve(0, 4, false).to_string(), "");
    }

    #[test]
    fn it_should_start_static_parameters_at_slot_0() {
        let names = [Some(Cow::Borrowed("first")), None];
        let r = resolver(None, Some(&names), &[1, 1], true);

        assert_eq!(r.resolve(0, 0, false).name, Some("first"));
        assert_eq!(r.resolve(0, 1, false).name, None);
    }

    #[test]
    fn it_should_compute_the_effective_pc_from_the_slot() {
        assert_eq!(effective_pc(10, 3), 11);
        assert_eq!(effective_pc(10, 4), 12);
        assert_eq!(effective_pc(10, 255), 12);
        assert_eq!(effective_pc(10, 256), 13);
    }
}
