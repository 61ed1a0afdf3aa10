use std::fmt;

/// Base types of the language's small type system.
///
/// `Boolean` never appears as a declared variable type — it only arises as
/// the intermediate result of a relational operator (§3 of the spec this
/// crate implements).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Void,
    Int,
    Boolean,
    Array,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseType::Void => "void",
            BaseType::Int => "int",
            BaseType::Boolean => "boolean",
            BaseType::Array => "array",
        };
        write!(f, "{}", name)
    }
}

/// TypeInfo is the structural type value attached to symbols and to
/// resolved/checked AST nodes.
///
/// An array is modelled as `base_type: Array` with an `element_type` and an
/// `array_size`; a function is modelled by a present `return_type` plus an
/// ordered `parameters` list. Both are owned values rather than interned —
/// this crate's types are small and cheaply `Clone`d, and there is no
/// convenient interning story in plain Rust that the teacher's own codebase
/// reaches for either.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    base_type: BaseType,
    element_type: Option<Box<TypeInfo>>,
    array_size: Option<usize>,
    return_type: Option<Box<TypeInfo>>,
    parameters: Vec<TypeInfo>,
}

impl TypeInfo {
    /// A plain scalar type: `VOID`, `INT`, or the intermediate `BOOLEAN`.
    pub fn new(base_type: BaseType) -> Self {
        TypeInfo {
            base_type,
            element_type: None,
            array_size: None,
            return_type: None,
            parameters: Vec::new(),
        }
    }

    /// An array of `size` elements of `element_type`.
    pub fn array_of(element_type: BaseType, size: usize) -> Self {
        TypeInfo {
            base_type: BaseType::Array,
            element_type: Some(Box::new(TypeInfo::new(element_type))),
            array_size: Some(size),
            return_type: None,
            parameters: Vec::new(),
        }
    }

    /// A function type returning `return_type`, with no parameters yet;
    /// chain `add_parameter` to append them in declaration order.
    pub fn function(return_type: TypeInfo) -> Self {
        TypeInfo {
            base_type: return_type.base_type,
            element_type: None,
            array_size: None,
            return_type: Some(Box::new(return_type)),
            parameters: Vec::new(),
        }
    }

    pub fn add_parameter(mut self, parameter: TypeInfo) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn base_type(&self) -> BaseType {
        self.base_type
    }

    pub fn element_type(&self) -> Option<&TypeInfo> {
        self.element_type.as_deref()
    }

    pub fn array_size(&self) -> Option<usize> {
        self.array_size
    }

    pub fn return_type(&self) -> Option<&TypeInfo> {
        self.return_type.as_deref()
    }

    pub fn parameters(&self) -> &[TypeInfo] {
        &self.parameters
    }

    pub fn is_array(&self) -> bool {
        self.base_type == BaseType::Array
    }

    pub fn is_function(&self) -> bool {
        self.return_type.is_some()
    }

    /// Structural compatibility: matching base type; matching array size for
    /// arrays; if either side is a function both must be, recursively on
    /// their return types; and parameter lists must match pairwise.
    ///
    /// This resolves an ambiguity the original C left asymmetric (it never
    /// compared `returnType` when only one side had one) in favor of the
    /// specification's own prose, which requires both sides to agree — see
    /// DESIGN.md.
    pub fn is_compatible_with(&self, other: &TypeInfo) -> bool {
        if self.base_type != other.base_type {
            return false;
        }
        if self.base_type == BaseType::Array && self.array_size != other.array_size {
            return false;
        }
        match (&self.return_type, &other.return_type) {
            (Some(a), Some(b)) if !a.is_compatible_with(b) => return false,
            (Some(_), None) | (None, Some(_)) => return false,
            _ => {}
        }
        if self.parameters.len() != other.parameters.len() {
            return false;
        }
        self.parameters
            .iter()
            .zip(other.parameters.iter())
            .all(|(a, b)| a.is_compatible_with(b))
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(return_type) = &self.return_type {
            write!(f, "(")?;
            for (i, param) in self.parameters.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", param)?;
            }
            return write!(f, ") -> {}", return_type);
        }
        if self.base_type == BaseType::Array {
            let element = self
                .element_type
                .as_ref()
                .map(|t| t.base_type.to_string())
                .unwrap_or_else(|| "int".to_string());
            return write!(f, "{}[{}]", element, self.array_size.unwrap_or(0));
        }
        write!(f, "{}", self.base_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_types_compatible_when_base_matches() {
        let a = TypeInfo::new(BaseType::Int);
        let b = TypeInfo::new(BaseType::Int);
        assert!(a.is_compatible_with(&b));
    }

    #[test]
    fn array_types_require_matching_size() {
        let a = TypeInfo::array_of(BaseType::Int, 3);
        let b = TypeInfo::array_of(BaseType::Int, 4);
        assert!(!a.is_compatible_with(&b));
        assert!(a.is_compatible_with(&TypeInfo::array_of(BaseType::Int, 3)));
    }

    #[test]
    fn function_types_require_matching_return_and_parameters() {
        let f1 = TypeInfo::function(TypeInfo::new(BaseType::Int))
            .add_parameter(TypeInfo::new(BaseType::Int));
        let f2 = TypeInfo::function(TypeInfo::new(BaseType::Int))
            .add_parameter(TypeInfo::new(BaseType::Int));
        assert!(f1.is_compatible_with(&f2));

        let f3 = TypeInfo::function(TypeInfo::new(BaseType::Void));
        assert!(!f1.is_compatible_with(&f3));
    }

    #[test]
    fn compatibility_is_reflexive_symmetric_and_transitive() {
        let a = TypeInfo::array_of(BaseType::Int, 2);
        let b = TypeInfo::array_of(BaseType::Int, 2);
        let c = TypeInfo::array_of(BaseType::Int, 2);
        assert!(a.is_compatible_with(&a));
        assert_eq!(a.is_compatible_with(&b), b.is_compatible_with(&a));
        assert!(a.is_compatible_with(&b) && b.is_compatible_with(&c) && a.is_compatible_with(&c));
    }

    #[test]
    fn display_renders_arrays_and_functions() {
        assert_eq!(format!("{}", TypeInfo::new(BaseType::Int)), "int");
        assert_eq!(format!("{}", TypeInfo::array_of(BaseType::Int, 5)), "int[5]");
        let func = TypeInfo::function(TypeInfo::new(BaseType::Void))
            .add_parameter(TypeInfo::new(BaseType::Int));
        assert_eq!(format!("{}", func), "(int) -> void");
    }
}
