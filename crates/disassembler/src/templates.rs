/// The line shapes a disassembled instruction can take. Each key documents
/// the order of the arguments passed along with it; that order is the stable
/// contract, the wording is up to the [`Templates`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    /// `[mnemonic]`
    Simple,
    /// `[mnemonic, local]`, where `local` is empty or starts with a space.
    Local,
    /// `[mnemonic, local, increment]`
    Iinc,
    /// `[mnemonic, value]` for `bipush` and `sipush`.
    Immediate,
    /// `[mnemonic, target]`
    Branch,
    /// `[mnemonic, index, value]`
    LdcInteger,
    /// `[mnemonic, index, value]`
    LdcFloat,
    /// `[mnemonic, index, escaped text]`
    LdcString,
    /// `[mnemonic, index, class name]`
    LdcClass,
    /// `[mnemonic, index, method signature]`
    LdcMethodType,
    /// `[mnemonic, index, reference kind, reference index]`
    LdcMethodHandle,
    /// `[mnemonic, index, name, type, bootstrap method index]`
    LdcDynamic,
    /// `[mnemonic, index, value]`
    Ldc2WLong,
    /// `[mnemonic, index, value]`
    Ldc2WDouble,
    /// `[mnemonic, index, declaring class, field name, field type]`
    FieldAccess,
    /// `[mnemonic, index, declaring class, method name, method signature]`
    MethodInvoke,
    /// `[mnemonic, index, declaring class, constructor signature]`
    ConstructorInvoke,
    /// `[mnemonic, index, declaring class, method name, method signature, count]`
    InterfaceInvoke,
    /// `[mnemonic, index, bootstrap method index, name, method signature]`
    DynamicInvoke,
    /// `[mnemonic, index, class name]` for `new`, `anewarray`, `checkcast`
    /// and `instanceof`.
    ClassReference,
    /// `[mnemonic, index, type, dimensions]`
    MultiANewArray,
    /// `[mnemonic, element type, atype code]`
    NewArray,
    /// `[mnemonic, default target]`
    SwitchDefault,
    /// `[key, target]`
    TableSwitchCase,
    /// `[key, target]`
    LookupSwitchCase,
    /// `[mnemonic]`, the line preceding a widened instruction.
    Wide,
}

/// Turns a template key and its ordered arguments into display text.
pub trait Templates {
    fn format(&self, key: TemplateKey, args: &[&str]) -> String;
}

/// Patterns with positional `{n}` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTemplates;
impl DefaultTemplates {
    pub fn pattern(key: TemplateKey) -> &'static str {
        match key {
            TemplateKey::Simple | TemplateKey::Wide => "{0}",
            TemplateKey::Local => "{0}{1}",
            TemplateKey::Iinc => "{0}{1} {2}",
            TemplateKey::Immediate | TemplateKey::Branch => "{0} {1}",
            TemplateKey::LdcInteger => "{0} <Integer {2}> [{1}]",
            TemplateKey::LdcFloat => "{0} <Float {2}> [{1}]",
            TemplateKey::LdcString => "{0} <String \"{2}\"> [{1}]",
            TemplateKey::LdcClass => "{0} <Class {2}> [{1}]",
            TemplateKey::LdcMethodType => "{0} <MethodType {2}> [{1}]",
            TemplateKey::LdcMethodHandle => "{0} <MethodHandle {2} #{3}> [{1}]",
            TemplateKey::LdcDynamic => "{0} <Dynamic {2} : {3}> [{1}] [bootstrap: {4}]",
            TemplateKey::Ldc2WLong => "{0} <Long {2}> [{1}]",
            TemplateKey::Ldc2WDouble => "{0} <Double {2}> [{1}]",
            TemplateKey::FieldAccess => "{0} {2}.{3} : {4} [{1}]",
            TemplateKey::MethodInvoke => "{0} {2}.{3}{4} [{1}]",
            TemplateKey::ConstructorInvoke => "{0} {2}{3} [{1}]",
            TemplateKey::InterfaceInvoke => "{0} {2}.{3}{4} [{1}] [nargs: {5}]",
            TemplateKey::DynamicInvoke => "{0} {3}{4} [{1}] [bootstrap: {2}]",
            TemplateKey::ClassReference => "{0} {2} [{1}]",
            TemplateKey::MultiANewArray => "{0} {2} [{1}] [dimensions: {3}]",
            TemplateKey::NewArray => "{0} {1} [{2}]",
            TemplateKey::SwitchDefault => "{0} default: {1}",
            TemplateKey::TableSwitchCase | TemplateKey::LookupSwitchCase => "case {0}: {1}",
        }
    }
}
impl Templates for DefaultTemplates {
    fn format(&self, key: TemplateKey, args: &[&str]) -> String {
        substitute(Self::pattern(key), args)
    }
}

/// Replaces every `{n}` in `pattern` with `args[n]`. Placeholders without a
/// matching argument are left as they are.
pub fn substitute(pattern: &str, args: &[&str]) -> String {
    let capacity = pattern.len() + args.iter().map(|a| a.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let argument = after.find('}').and_then(|close| {
            let n = after[..close].parse::<usize>().ok()?;
            Some((args.get(n)?, close))
        });
        match argument {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}
