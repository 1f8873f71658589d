use byteorder::{BigEndian, WriteBytesExt};
use jdis_class_file::{constant_pool::tags, ClassFile, ConstantPool};
use jdis_disassembler::{
    opcodes::*, Disassembler, DisassemblerError, DisassemblerOptions, DisassemblyContext,
    Operands,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Bytes(Vec<u8>);
impl Bytes {
    fn u1(&mut self, value: u8) -> &mut Self {
        self.0.push(value);
        self
    }

    fn u2(&mut self, value: u16) -> &mut Self {
        self.0.write_u16::<BigEndian>(value).unwrap();
        self
    }

    fn u4(&mut self, value: u32) -> &mut Self {
        self.0.write_u32::<BigEndian>(value).unwrap();
        self
    }

    fn utf8(&mut self, s: &str) -> &mut Self {
        self.u1(tags::UTF8).u2(s.len() as u16);
        self.0.extend_from_slice(s.as_bytes());
        self
    }

    fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(bytes);
        self
    }
}

const GREET_CODE: &[u8] = &[0x2d, 0xb6, 0, 8, 0xb0];

/// The equivalent of
///
/// ```java
/// package my;
/// public class Greeter {
///     public String greet(long count, Object target) {
///         return target.toString();
///     }
/// }
/// ```
fn greeter() -> Vec<u8> {
    let mut b = Bytes::default();
    b.u4(0xCAFEBABE).u2(0).u2(52);

    b.u2(19)
        .utf8("my/Greeter") // #1
        .raw(&[tags::CLASS, 0, 1]) // #2
        .utf8("java/lang/Object") // #3
        .raw(&[tags::CLASS, 0, 3]) // #4
        .utf8("toString") // #5
        .utf8("()Ljava/lang/String;") // #6
        .raw(&[tags::NAME_AND_TYPE, 0, 5, 0, 6]) // #7
        .raw(&[tags::METHOD_REF, 0, 4, 0, 7]) // #8
        .utf8("greet") // #9
        .utf8("(JLjava/lang/Object;)Ljava/lang/String;") // #10
        .utf8("Code") // #11
        .utf8("LocalVariableTable") // #12
        .utf8("this") // #13
        .utf8("Lmy/Greeter;") // #14
        .utf8("count") // #15
        .utf8("J") // #16
        .utf8("target") // #17
        .utf8("Ljava/lang/Object;"); // #18

    b.u2(0x0021).u2(2).u2(4).u2(0);
    b.u2(0);

    b.u2(1);
    b.u2(0x0001).u2(9).u2(10).u2(1);
    b.u2(11).u4(12 + GREET_CODE.len() as u32 + 6 + 32);
    b.u2(2).u2(4).u4(GREET_CODE.len() as u32).raw(GREET_CODE);
    b.u2(0);
    b.u2(1);
    b.u2(12).u4(32).u2(3);
    b.u2(0).u2(5).u2(13).u2(14).u2(0);
    b.u2(0).u2(5).u2(15).u2(16).u2(1);
    b.u2(0).u2(5).u2(17).u2(18).u2(3);

    b.u2(0);
    b.0
}

fn method_context<'a>(
    class_file: &ClassFile<'a>,
    options: DisassemblerOptions,
) -> DisassemblyContext<'a, String> {
    let method = class_file.method_by_name("greet").unwrap().unwrap();
    DisassemblyContext::for_method(String::new(), options, class_file, method).unwrap()
}

fn static_disassembler<'r>(
    constant_pool: &'r ConstantPool<'static>,
    descriptor: &str,
) -> Disassembler<'r, 'static, String> {
    let context =
        DisassemblyContext::new(String::new(), DisassemblerOptions::default(), descriptor, true)
            .unwrap();
    Disassembler::new(constant_pool, context)
}

#[test]
fn test_method_ref_end_to_end() {
    let _ = pretty_env_logger::try_init();

    let bytes = greeter();
    let class_file = ClassFile::parse(&bytes).unwrap();
    let context = method_context(&class_file, DisassemblerOptions::default());
    let mut disassembler = Disassembler::new(&class_file.constant_pool, context);

    disassembler.instruction(0, ALOAD_3, &Operands::None).unwrap();
    disassembler
        .instruction(1, INVOKEVIRTUAL, &Operands::Constant(8))
        .unwrap();
    disassembler.instruction(4, ARETURN, &Operands::None).unwrap();

    assert_eq!(
        disassembler.into_sink(),
        "   0: aload_3 [target]\n\
         \x20  1: invokevirtual java.lang.Object.toString() : java.lang.String [8]\n\
         \x20  4: areturn\n"
    );
}

#[test]
fn test_compact_names() {
    let bytes = greeter();
    let class_file = ClassFile::parse(&bytes).unwrap();
    let options = DisassemblerOptions {
        compact_names: true,
        ..Default::default()
    };
    let mut disassembler =
        Disassembler::new(&class_file.constant_pool, method_context(&class_file, options));

    disassembler
        .instruction(1, INVOKEVIRTUAL, &Operands::Constant(8))
        .unwrap();

    assert_eq!(
        disassembler.into_sink(),
        "   1: invokevirtual Object.toString() : String [8]\n"
    );
}

#[test]
fn test_local_variable_table_names() {
    let bytes = greeter();
    let class_file = ClassFile::parse(&bytes).unwrap();
    let context = method_context(&class_file, DisassemblerOptions::default());
    let resolver = context.resolver();

    assert_eq!(resolver.resolve(0, 0, false).to_string(), " [this]");
    assert_eq!(resolver.resolve(0, 1, true).to_string(), " 1 [count]");
    // the second half of the long has no name
    assert_eq!(resolver.resolve(0, 2, true).to_string(), " 2");
    assert_eq!(resolver.resolve(4, 3, false).to_string(), "");
}

#[test]
fn test_table_switch() {
    let cp = ConstantPool::build(&[], 0, 1).unwrap();
    let mut disassembler = static_disassembler(&cp, "(I)V");

    disassembler
        .instruction(
            2,
            TABLESWITCH,
            &Operands::TableSwitch {
                default: 40,
                low: -1,
                high: 1,
                offsets: vec![30, 34, 38],
            },
        )
        .unwrap();

    assert_eq!(
        disassembler.into_sink(),
        "   2: tableswitch default: 42\n\
         \x20       case -1: 32\n\
         \x20       case 0: 36\n\
         \x20       case 1: 40\n"
    );
}

#[test]
fn test_malformed_table_switch() {
    let cp = ConstantPool::build(&[], 0, 1).unwrap();
    let mut disassembler = static_disassembler(&cp, "(I)V");

    let result = disassembler.instruction(
        0,
        TABLESWITCH,
        &Operands::TableSwitch {
            default: 20,
            low: 0,
            high: 3,
            offsets: vec![10, 12],
        },
    );

    assert_eq!(
        result,
        Err(DisassemblerError::MalformedSwitch {
            low: 0,
            high: 3,
            offsets: 2
        })
    );
    assert_eq!(disassembler.into_sink(), "");
}

#[test]
fn test_lookup_switch_keeps_key_order() {
    let cp = ConstantPool::build(&[], 0, 1).unwrap();
    let mut disassembler = static_disassembler(&cp, "(I)V");

    disassembler
        .instruction(
            0,
            LOOKUPSWITCH,
            &Operands::LookupSwitch {
                default: 50,
                pairs: vec![(100, 20), (-5, 30), (7, 40)],
            },
        )
        .unwrap();

    assert_eq!(
        disassembler.into_sink(),
        "   0: lookupswitch default: 50\n\
         \x20       case 100: 20\n\
         \x20       case -5: 30\n\
         \x20       case 7: 40\n"
    );
}

#[test]
fn test_wide_iinc() {
    let cp = ConstantPool::build(&[], 0, 1).unwrap();
    let mut disassembler = static_disassembler(&cp, "()V");

    disassembler
        .instruction(
            5,
            WIDE,
            &Operands::Wide {
                opcode: IINC,
                operands: Box::new(Operands::Increment {
                    slot: 300,
                    value: 7,
                }),
            },
        )
        .unwrap();

    assert_eq!(disassembler.into_sink(), "   5: wide\n   6: iinc 300 7\n");
}

#[test]
fn test_wide_only_applies_to_locals() {
    let cp = ConstantPool::build(&[], 0, 1).unwrap();
    let mut disassembler = static_disassembler(&cp, "()V");

    let result = disassembler.instruction(
        0,
        WIDE,
        &Operands::Wide {
            opcode: GOTO,
            operands: Box::new(Operands::Branch(4)),
        },
    );

    assert_eq!(result, Err(DisassemblerError::UnexpectedOperands("wide")));
    assert_eq!(disassembler.into_sink(), "");
}

#[test]
fn test_failed_instruction_leaves_the_sink_alone() {
    let bytes = greeter();
    let class_file = ClassFile::parse(&bytes).unwrap();
    let context = method_context(&class_file, DisassemblerOptions::default());
    let mut disassembler = Disassembler::new(&class_file.constant_pool, context);

    disassembler.instruction(0, ALOAD_3, &Operands::None).unwrap();
    // #8 is a Methodref, not a Fieldref
    let result = disassembler.instruction(1, GETFIELD, &Operands::Constant(8));

    assert_eq!(
        result,
        Err(DisassemblerError::UnexpectedConstantPoolEntry {
            mnemonic: "getfield",
            expected: "Fieldref",
            found: "Methodref"
        })
    );
    assert_eq!(disassembler.into_sink(), "   0: aload_3 [target]\n");
}
