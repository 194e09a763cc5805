//! Type descriptors for hook parameters.

use std::fmt;

/// A module that declares named types, as seen from generated code.
///
/// `name` is the identifier generated code uses to qualify types from this
/// module; it defaults to the last `::` segment of `path`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    path: String,
    name: String,
}

impl ModuleRef {
    /// Reference a module by path, displayed under its last segment.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit("::").next().unwrap_or_default().to_owned();
        ModuleRef { path, name }
    }

    /// Reference a module by path, displayed under an explicit alias.
    pub fn aliased(path: impl Into<String>, name: impl Into<String>) -> Self {
        ModuleRef {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Full module path, e.g. `std::time`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name used to qualify types, e.g. `time`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `name` differs from the last segment of `path`.
    pub fn is_aliased(&self) -> bool {
        self.path.rsplit("::").next() != Some(self.name.as_str())
    }
}

/// A struct field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    /// Visible outside the declaring module (`pub`).
    pub exported: bool,
}

impl Field {
    pub fn exported(name: impl Into<String>, ty: Ty) -> Self {
        Field {
            name: name.into(),
            ty,
            exported: true,
        }
    }

    pub fn private(name: impl Into<String>, ty: Ty) -> Self {
        Field {
            name: name.into(),
            ty,
            exported: false,
        }
    }
}

/// Identity of a named type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NamedTy<'a> {
    pub name: &'a str,
    /// `None` for types declared in the package being generated.
    pub module: Option<&'a ModuleRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum TyKind {
    /// Rendered verbatim; carries no identity (`u64`, `Option<String>`).
    Opaque(String),
    Named {
        name: String,
        module: Option<ModuleRef>,
        /// `Some` when the named type is a struct.
        fields: Option<Vec<Field>>,
    },
    Pointer(Box<Ty>),
}

/// Descriptor of a parameter or field type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ty {
    kind: TyKind,
}

impl Ty {
    /// A type without identity, rendered as written.
    pub fn opaque(text: impl Into<String>) -> Self {
        Ty {
            kind: TyKind::Opaque(text.into()),
        }
    }

    /// A named, non-struct type declared in the generated package.
    pub fn named(name: impl Into<String>) -> Self {
        Ty {
            kind: TyKind::Named {
                name: name.into(),
                module: None,
                fields: None,
            },
        }
    }

    /// A named struct type declared in the generated package.
    pub fn structure(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Ty {
            kind: TyKind::Named {
                name: name.into(),
                module: None,
                fields: Some(fields),
            },
        }
    }

    /// A shared reference to `pointee`.
    pub fn pointer(pointee: Ty) -> Self {
        Ty {
            kind: TyKind::Pointer(Box::new(pointee)),
        }
    }

    /// Move a named type into `module`. Has no effect on other kinds.
    #[must_use]
    pub fn in_module(mut self, module: ModuleRef) -> Self {
        if let TyKind::Named { module: m, .. } = &mut self.kind {
            *m = Some(module);
        }
        self
    }

    /// Whether this is a named struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TyKind::Named { fields: Some(_), .. })
    }

    /// Exported fields in declaration order; empty for non-structs.
    pub fn exported_fields(&self) -> impl Iterator<Item = &Field> {
        let fields: &[Field] = match &self.kind {
            TyKind::Named {
                fields: Some(fields),
                ..
            } => fields,
            _ => &[],
        };
        fields.iter().filter(|f| f.exported)
    }

    /// The referenced type, if this is a pointer.
    pub fn pointee(&self) -> Option<&Ty> {
        match &self.kind {
            TyKind::Pointer(inner) => Some(&**inner),
            _ => None,
        }
    }

    /// Identity of a named type.
    pub fn named_ty(&self) -> Option<NamedTy<'_>> {
        match &self.kind {
            TyKind::Named { name, module, .. } => Some(NamedTy {
                name,
                module: module.as_ref(),
            }),
            _ => None,
        }
    }

    /// Source text of an opaque type.
    pub fn opaque_text(&self) -> Option<&str> {
        match &self.kind {
            TyKind::Opaque(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Last path segment of the type, looking through pointers.
    pub fn basename(&self) -> &str {
        match &self.kind {
            TyKind::Opaque(text) => text.rsplit("::").next().unwrap_or(text),
            TyKind::Named { name, .. } => name,
            TyKind::Pointer(inner) => inner.basename(),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TyKind::Opaque(text) => f.write_str(text),
            TyKind::Named {
                name,
                module: Some(module),
                ..
            } => write!(f, "{}::{name}", module.path()),
            TyKind::Named { name, .. } => f.write_str(name),
            TyKind::Pointer(inner) => write!(f, "&{inner}"),
        }
    }
}
