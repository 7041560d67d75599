//! Canonical bit-packed state encodings.
//!
//! A [`CompressedState`] is the only representation of a configuration the
//! builder ever sees: generators produce them, the registry hashes and stores
//! them, and the frontier refers to them by id. Two configurations are the same
//! state if and only if their encodings are bit-identical.
//!
//! [`VariableInformation`] is the usual way for a generator to produce
//! encodings: it assigns every bounded variable a fixed bit slice, so that
//! encoding is canonical by construction.
//!
//! ```text
//! bit:   0   1 2 3   4 5 6 7 8
//!       [b] [ x:0..7 ] [ y:-4..27 ]
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::GeneratorError;
use crate::utils::{hash_words, MyHash};

/// Canonical bit-packed encoding of one configuration.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct CompressedState {
    words: Vec<u64>,
    bit_len: usize,
}

impl CompressedState {
    const BITS_PER_WORD: usize = 64;

    /// Creates an all-zero encoding of the given bit length.
    pub fn new(bit_len: usize) -> Self {
        Self {
            words: vec![0; (bit_len + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD],
            bit_len,
        }
    }

    /// Creates a 64-bit encoding holding a single integer.
    ///
    /// Handy for generators whose states are naturally numbered.
    pub fn from_u64(value: u64) -> Self {
        Self {
            words: vec![value],
            bit_len: Self::BITS_PER_WORD,
        }
    }

    /// Returns the number of bits in the encoding.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the raw words of the encoding.
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    /// Returns the single bit at `offset`.
    pub fn get_bool(&self, offset: usize) -> bool {
        self.get_bits(offset, 1) == 1
    }

    /// Sets the single bit at `offset`.
    pub fn set_bool(&mut self, offset: usize, value: bool) {
        self.set_bits(offset, 1, value as u64);
    }

    /// Reads `width` bits starting at `offset` as an unsigned integer.
    ///
    /// # Panics
    ///
    /// Panics if the slice exceeds the encoding or `width > 64`.
    pub fn get_bits(&self, offset: usize, width: usize) -> u64 {
        assert!(width <= 64, "Bit width {} exceeds 64", width);
        assert!(offset + width <= self.bit_len, "Bit slice {}..{} out of bounds", offset, offset + width);
        if width == 0 {
            return 0;
        }
        let (w, b) = (offset / Self::BITS_PER_WORD, offset % Self::BITS_PER_WORD);
        let mut value = self.words[w] >> b;
        if b + width > Self::BITS_PER_WORD {
            value |= self.words[w + 1] << (Self::BITS_PER_WORD - b);
        }
        value & mask(width)
    }

    /// Writes the low `width` bits of `value` starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the slice exceeds the encoding, `width > 64`, or `value` does not fit into `width` bits.
    pub fn set_bits(&mut self, offset: usize, width: usize, value: u64) {
        assert!(width <= 64, "Bit width {} exceeds 64", width);
        assert!(offset + width <= self.bit_len, "Bit slice {}..{} out of bounds", offset, offset + width);
        assert_eq!(value & !mask(width), 0, "Value {} does not fit into {} bits", value, width);
        if width == 0 {
            return;
        }
        let (w, b) = (offset / Self::BITS_PER_WORD, offset % Self::BITS_PER_WORD);
        self.words[w] = (self.words[w] & !(mask(width) << b)) | (value << b);
        if b + width > Self::BITS_PER_WORD {
            let spill = b + width - Self::BITS_PER_WORD;
            let shift = Self::BITS_PER_WORD - b;
            self.words[w + 1] = (self.words[w + 1] & !mask(spill)) | (value >> shift);
        }
    }
}

fn mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

impl MyHash for CompressedState {
    fn hash(&self) -> u64 {
        hash_words(self.bit_len, &self.words)
    }
}

impl fmt::Debug for CompressedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedState[{}](", self.bit_len)?;
        for (i, w) in self.words.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:016x}", w)?;
        }
        write!(f, ")")
    }
}

/// Value of a single state variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Value {
    Bool(bool),
    Int(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
        }
    }
}

/// Full, uncompressed variable assignment of one state.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Valuation {
    entries: Vec<(String, Value)>,
}

impl Valuation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable assignment; order is preserved for display.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    /// Looks up a variable by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "\t& ")?;
            }
            match value {
                Value::Bool(true) => write!(f, "{}", name)?,
                Value::Bool(false) => write!(f, "!{}", name)?,
                Value::Int(v) => write!(f, "{}={}", name, v)?,
            }
        }
        write!(f, "]")
    }
}

#[derive(Debug, Clone)]
enum VariableKind {
    Bool,
    Int { lower: i64, upper: i64 },
}

#[derive(Debug, Clone)]
struct Variable {
    name: String,
    kind: VariableKind,
    offset: usize,
    width: usize,
}

/// Bit layout of the state variables of a model.
///
/// Integer variables are stored relative to their lower bound, using the
/// fewest bits that can hold `upper - lower`.
#[derive(Debug, Clone, Default)]
pub struct VariableInformation {
    variables: Vec<Variable>,
    by_name: HashMap<String, usize>,
    total_bits: usize,
}

impl VariableInformation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a boolean variable occupying one bit.
    ///
    /// # Panics
    ///
    /// Panics if a variable with the same name was already declared.
    pub fn add_bool(&mut self, name: impl Into<String>) -> &mut Self {
        self.add(name.into(), VariableKind::Bool, 1)
    }

    /// Declares an integer variable with inclusive bounds.
    ///
    /// # Panics
    ///
    /// Panics if `lower > upper` or the name was already declared.
    pub fn add_int(&mut self, name: impl Into<String>, lower: i64, upper: i64) -> &mut Self {
        assert!(lower <= upper, "Empty range {}..={}", lower, upper);
        let span = upper.abs_diff(lower);
        let width = (64 - span.leading_zeros() as usize).max(1);
        self.add(name.into(), VariableKind::Int { lower, upper }, width)
    }

    fn add(&mut self, name: String, kind: VariableKind, width: usize) -> &mut Self {
        assert!(!self.by_name.contains_key(&name), "Variable '{}' declared twice", name);
        self.by_name.insert(name.clone(), self.variables.len());
        self.variables.push(Variable {
            name,
            kind,
            offset: self.total_bits,
            width,
        });
        self.total_bits += width;
        self
    }

    /// Returns the total number of bits of an encoding.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Returns the number of declared variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns an all-zero encoding of the right size.
    ///
    /// Integer variables read as their lower bound in it.
    pub fn blank(&self) -> CompressedState {
        CompressedState::new(self.total_bits)
    }

    fn variable(&self, name: &str) -> Result<&Variable, GeneratorError> {
        self.by_name
            .get(name)
            .map(|&i| &self.variables[i])
            .ok_or_else(|| GeneratorError::UnknownVariable { name: name.to_string() })
    }

    /// Writes a variable into an encoding.
    ///
    /// Fails with [`GeneratorError::EncodingOverflow`] if the value lies
    /// outside the declared range, or the variable kind does not match.
    pub fn set(&self, state: &mut CompressedState, name: &str, value: Value) -> Result<(), GeneratorError> {
        let var = self.variable(name)?;
        let raw = match (&var.kind, value) {
            (VariableKind::Bool, Value::Bool(b)) => b as u64,
            (VariableKind::Int { lower, upper }, Value::Int(v)) if (*lower..=*upper).contains(&v) => {
                v.abs_diff(*lower)
            }
            (_, Value::Int(v)) => {
                return Err(GeneratorError::EncodingOverflow {
                    variable: var.name.clone(),
                    value: v,
                })
            }
            (_, Value::Bool(b)) => {
                return Err(GeneratorError::EncodingOverflow {
                    variable: var.name.clone(),
                    value: b as i64,
                })
            }
        };
        state.set_bits(var.offset, var.width, raw);
        Ok(())
    }

    /// Reads a variable from an encoding.
    pub fn get(&self, state: &CompressedState, name: &str) -> Result<Value, GeneratorError> {
        let var = self.variable(name)?;
        Ok(Self::read(var, state))
    }

    fn read(var: &Variable, state: &CompressedState) -> Value {
        let raw = state.get_bits(var.offset, var.width);
        match var.kind {
            VariableKind::Bool => Value::Bool(raw == 1),
            VariableKind::Int { lower, .. } => Value::Int(lower.wrapping_add(raw as i64)),
        }
    }

    /// Encodes a full assignment; variables not mentioned keep their blank value.
    pub fn encode<'a>(
        &self,
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<CompressedState, GeneratorError> {
        let mut state = self.blank();
        for (name, value) in values {
            self.set(&mut state, name, value)?;
        }
        Ok(state)
    }

    /// Decodes every declared variable, in declaration order.
    pub fn decode(&self, state: &CompressedState) -> Valuation {
        let mut valuation = Valuation::new();
        for var in &self.variables {
            valuation.push(var.name.clone(), Self::read(var, state));
        }
        valuation
    }
}
