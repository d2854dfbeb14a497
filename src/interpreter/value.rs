use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use compact_str::{format_compact, CompactString, ToCompactString};

use super::error::RuntimeError;
use super::tree::Statement;
use super::SystemContext;

pub const INIT_METHOD: &str = "__init__";
pub const STR_METHOD: &str = "__str__";
pub const EQ_METHOD: &str = "__eq__";
pub const LT_METHOD: &str = "__lt__";
pub const ADD_METHOD: &str = "__add__";

/// A flat name-to-handle mapping. One exists at the top level and one per
/// active method invocation; there is no parent chain between them.
pub type Closure = HashMap<CompactString, ObjectHandle>;

/// A user-defined method. `formal_params` does not include `self`.
#[derive(Debug, PartialEq)]
pub struct Method {
    pub name: CompactString,
    pub formal_params: Vec<CompactString>,
    pub body: Statement,
}

#[derive(Debug, PartialEq)]
pub struct Class {
    name: CompactString,
    methods: Vec<Rc<Method>>,
    index: HashMap<CompactString, Rc<Method>>,
    parent: Option<Rc<Class>>,
}

impl Class {
    pub fn new(name: CompactString, methods: Vec<Method>, parent: Option<Rc<Class>>) -> Self {
        let methods: Vec<Rc<Method>> = methods.into_iter().map(Rc::new).collect();
        let index = methods
            .iter()
            .map(|method| (method.name.clone(), method.clone()))
            .collect();
        Self {
            name,
            methods,
            index,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[Rc<Method>] {
        &self.methods
    }

    pub fn parent(&self) -> Option<&Rc<Class>> {
        self.parent.as_ref()
    }

    /// Resolves a method by name, walking the parent chain on a miss.
    /// Resolution happens at every call, never at class creation.
    pub fn get_method(&self, name: &str) -> Option<&Rc<Method>> {
        match self.index.get(name) {
            Some(method) => Some(method),
            None => self
                .parent
                .as_ref()
                .and_then(|parent| parent.get_method(name)),
        }
    }

    pub fn has_method(&self, name: &str, argument_count: usize) -> bool {
        self.get_method(name)
            .is_some_and(|method| method.formal_params.len() == argument_count)
    }
}

#[derive(Debug, PartialEq)]
pub struct Instance {
    class: Rc<Class>,
    fields: RefCell<Closure>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(Closure::new()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    pub fn fields(&self) -> Ref<'_, Closure> {
        self.fields.borrow()
    }

    pub fn fields_mut(&self) -> RefMut<'_, Closure> {
        self.fields.borrow_mut()
    }
}

#[derive(Debug, PartialEq)]
pub enum Object {
    Number(i64),
    Bool(bool),
    String(CompactString),
    Class(Rc<Class>),
    Instance(Instance),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Number(_) => "a number",
            Object::Bool(_) => "a bool",
            Object::String(_) => "a string",
            Object::Class(_) => "a class",
            Object::Instance(_) => "an instance",
        }
    }
}

/// A shared handle to a runtime object. The empty handle encodes `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectHandle(Option<Rc<Object>>);

impl ObjectHandle {
    /// Allocates a fresh object and returns the owning handle.
    pub fn own(object: Object) -> Self {
        Self(Some(Rc::new(object)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    /// Another handle to the same underlying object.
    pub fn share(&self) -> Self {
        Self(self.0.clone())
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&Object> {
        self.0.as_deref()
    }

    /// Stable identity of the underlying allocation; 0 for the empty handle.
    pub fn address(&self) -> usize {
        self.0.as_ref().map_or(0, |object| Rc::as_ptr(object) as usize)
    }

    pub fn type_name(&self) -> &'static str {
        match self.get() {
            Some(object) => object.type_name(),
            None => "None",
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.get() {
            Some(Object::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.get() {
            Some(Object::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&CompactString> {
        match self.get() {
            Some(Object::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Rc<Class>> {
        match self.get() {
            Some(Object::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self.get() {
            Some(Object::Instance(instance)) => Some(instance),
            _ => None,
        }
    }
}

pub fn is_true(object: &ObjectHandle) -> bool {
    match object.get() {
        None => false,
        Some(Object::Number(value)) => *value != 0,
        Some(Object::Bool(value)) => *value,
        Some(Object::String(value)) => !value.is_empty(),
        Some(Object::Class(_)) | Some(Object::Instance(_)) => false,
    }
}

pub fn equal<C: SystemContext>(
    lhs: &ObjectHandle,
    rhs: &ObjectHandle,
    context: &mut C,
) -> Result<bool, RuntimeError> {
    if lhs.is_none() && rhs.is_none() {
        return Ok(true);
    }
    if let (Some(left), Some(right)) = (lhs.as_number(), rhs.as_number()) {
        return Ok(left == right);
    }
    if let (Some(left), Some(right)) = (lhs.as_string(), rhs.as_string()) {
        return Ok(left == right);
    }
    if let (Some(left), Some(right)) = (lhs.as_bool(), rhs.as_bool()) {
        return Ok(left == right);
    }
    if lhs
        .as_instance()
        .is_some_and(|instance| instance.class().has_method(EQ_METHOD, 1))
    {
        let result = call_method(lhs, EQ_METHOD, vec![rhs.share()], context)?;
        return Ok(is_true(&result));
    }
    Err(RuntimeError::IncomparableEquality(
        lhs.type_name(),
        rhs.type_name(),
    ))
}

pub fn less<C: SystemContext>(
    lhs: &ObjectHandle,
    rhs: &ObjectHandle,
    context: &mut C,
) -> Result<bool, RuntimeError> {
    if let (Some(left), Some(right)) = (lhs.as_number(), rhs.as_number()) {
        return Ok(left < right);
    }
    if let (Some(left), Some(right)) = (lhs.as_string(), rhs.as_string()) {
        return Ok(left < right);
    }
    if let (Some(left), Some(right)) = (lhs.as_bool(), rhs.as_bool()) {
        return Ok(left < right);
    }
    if lhs
        .as_instance()
        .is_some_and(|instance| instance.class().has_method(LT_METHOD, 1))
    {
        let result = call_method(lhs, LT_METHOD, vec![rhs.share()], context)?;
        return Ok(is_true(&result));
    }
    Err(RuntimeError::IncomparableOrdering(
        lhs.type_name(),
        rhs.type_name(),
    ))
}

pub fn not_equal<C: SystemContext>(
    lhs: &ObjectHandle,
    rhs: &ObjectHandle,
    context: &mut C,
) -> Result<bool, RuntimeError> {
    Ok(!equal(lhs, rhs, context)?)
}

pub fn greater<C: SystemContext>(
    lhs: &ObjectHandle,
    rhs: &ObjectHandle,
    context: &mut C,
) -> Result<bool, RuntimeError> {
    Ok(!less(lhs, rhs, context)? && not_equal(lhs, rhs, context)?)
}

pub fn less_or_equal<C: SystemContext>(
    lhs: &ObjectHandle,
    rhs: &ObjectHandle,
    context: &mut C,
) -> Result<bool, RuntimeError> {
    Ok(!greater(lhs, rhs, context)?)
}

pub fn greater_or_equal<C: SystemContext>(
    lhs: &ObjectHandle,
    rhs: &ObjectHandle,
    context: &mut C,
) -> Result<bool, RuntimeError> {
    Ok(!less(lhs, rhs, context)?)
}

/// Invokes a method on an instance. The callee sees a fresh closure holding
/// `self` and the formal parameters and nothing else.
pub fn call_method<C: SystemContext>(
    object: &ObjectHandle,
    method_name: &str,
    actual_args: Vec<ObjectHandle>,
    context: &mut C,
) -> Result<ObjectHandle, RuntimeError> {
    let Some(instance) = object.as_instance() else {
        return Err(RuntimeError::NotAnInstance(object.type_name()));
    };
    let class = instance.class();
    let Some(method) = class
        .get_method(method_name)
        .filter(|method| method.formal_params.len() == actual_args.len())
    else {
        return Err(RuntimeError::UndefinedMethod {
            class: class.name().into(),
            method: method_name.into(),
            arity: actual_args.len(),
        });
    };
    let mut closure = Closure::new();
    closure.insert(CompactString::const_new("self"), object.share());
    for (param, arg) in method.formal_params.iter().zip(actual_args) {
        closure.insert(param.clone(), arg);
    }
    method.body.evaluate(&mut closure, context)
}

/// The printable form of a value: `None` for the empty handle, `True` and
/// `False` for bools, decimal for numbers, raw contents for strings,
/// `Class Name` for classes, and for instances either the result of
/// `__str__` or an address-based placeholder.
pub fn render<C: SystemContext>(
    object: &ObjectHandle,
    context: &mut C,
) -> Result<CompactString, RuntimeError> {
    let text = match object.get() {
        None => CompactString::const_new("None"),
        Some(Object::Number(value)) => value.to_compact_string(),
        Some(Object::Bool(true)) => CompactString::const_new("True"),
        Some(Object::Bool(false)) => CompactString::const_new("False"),
        Some(Object::String(value)) => value.clone(),
        Some(Object::Class(class)) => format_compact!("Class {}", class.name()),
        Some(Object::Instance(instance)) => {
            if instance.class().has_method(STR_METHOD, 0) {
                let result = call_method(object, STR_METHOD, Vec::new(), context)?;
                render(&result, context)?
            } else {
                format_compact!(
                    "<{} instance at {:#x}>",
                    instance.class().name(),
                    object.address()
                )
            }
        }
    };
    Ok(text)
}
