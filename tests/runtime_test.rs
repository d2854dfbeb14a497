use std::rc::Rc;

use proptest::prelude::*;

use pyrite::interpreter::context::BufferedContext;
use pyrite::interpreter::{
    call_method, equal, greater, greater_or_equal, is_true, less, less_or_equal, not_equal,
    render, Class, Instance, Method, Object, ObjectHandle, RuntimeError, Statement,
};

fn number(value: i64) -> ObjectHandle {
    ObjectHandle::own(Object::Number(value))
}

fn string(value: &str) -> ObjectHandle {
    ObjectHandle::own(Object::String(value.into()))
}

fn boolean(value: bool) -> ObjectHandle {
    ObjectHandle::own(Object::Bool(value))
}

fn empty_class(name: &str) -> Rc<Class> {
    Rc::new(Class::new(name.into(), Vec::new(), None))
}

/// A method whose body immediately returns the given constant.
fn constant_method(name: &str, formal_params: &[&str], body: Statement) -> Method {
    Method {
        name: name.into(),
        formal_params: formal_params.iter().map(|p| (*p).into()).collect(),
        body: Statement::MethodBody {
            body: Box::new(Statement::Return {
                value: Box::new(body),
            }),
        },
    }
}

#[test]
fn truthiness_table() {
    assert!(!is_true(&ObjectHandle::none()));
    assert!(!is_true(&number(0)));
    assert!(is_true(&number(3)));
    assert!(is_true(&number(-1)));
    assert!(!is_true(&boolean(false)));
    assert!(is_true(&boolean(true)));
    assert!(!is_true(&string("")));
    assert!(is_true(&string("x")));

    let class = empty_class("A");
    assert!(!is_true(&ObjectHandle::own(Object::Class(class.clone()))));
    assert!(!is_true(&ObjectHandle::own(Object::Instance(
        Instance::new(class)
    ))));
}

#[test]
fn equality_over_primitives() {
    let mut context = BufferedContext::new();
    assert!(equal(&ObjectHandle::none(), &ObjectHandle::none(), &mut context).unwrap());
    assert!(equal(&number(3), &number(3), &mut context).unwrap());
    assert!(!equal(&number(3), &number(4), &mut context).unwrap());
    assert!(equal(&string("ab"), &string("ab"), &mut context).unwrap());
    assert!(equal(&boolean(true), &boolean(true), &mut context).unwrap());
    assert!(not_equal(&number(3), &number(4), &mut context).unwrap());
}

#[test]
fn mixed_types_are_incomparable() {
    let mut context = BufferedContext::new();
    assert_eq!(
        equal(&number(1), &string("1"), &mut context),
        Err(RuntimeError::IncomparableEquality("a number", "a string"))
    );
    assert_eq!(
        equal(&ObjectHandle::none(), &number(1), &mut context),
        Err(RuntimeError::IncomparableEquality("None", "a number"))
    );
    assert_eq!(
        less(&boolean(true), &number(1), &mut context),
        Err(RuntimeError::IncomparableOrdering("a bool", "a number"))
    );
}

#[test]
fn ordering_over_primitives() {
    let mut context = BufferedContext::new();
    assert!(less(&number(1), &number(2), &mut context).unwrap());
    assert!(less(&string("a"), &string("b"), &mut context).unwrap());
    assert!(less(&boolean(false), &boolean(true), &mut context).unwrap());
    assert!(greater(&number(2), &number(1), &mut context).unwrap());
    assert!(less_or_equal(&number(2), &number(2), &mut context).unwrap());
    assert!(greater_or_equal(&number(2), &number(2), &mut context).unwrap());
}

#[test]
fn equality_delegates_to_dunder_eq() {
    let method = constant_method("__eq__", &["other"], Statement::BoolConst(true));
    let class = Rc::new(Class::new("A".into(), vec![method], None));
    let instance = ObjectHandle::own(Object::Instance(Instance::new(class)));
    let mut context = BufferedContext::new();
    assert!(equal(&instance, &number(1), &mut context).unwrap());
}

#[test]
fn ordering_delegates_to_dunder_lt() {
    let method = constant_method("__lt__", &["other"], Statement::BoolConst(false));
    let class = Rc::new(Class::new("A".into(), vec![method], None));
    let instance = ObjectHandle::own(Object::Instance(Instance::new(class)));
    let mut context = BufferedContext::new();
    assert!(!less(&instance, &number(1), &mut context).unwrap());
    assert!(greater_or_equal(&instance, &number(1), &mut context).unwrap());
}

#[test]
fn method_lookup_walks_the_parent_chain() {
    let inherited = constant_method("m", &[], Statement::NumericConst(1));
    let parent = Rc::new(Class::new("P".into(), vec![inherited], None));
    let child = Rc::new(Class::new("C".into(), Vec::new(), Some(parent.clone())));
    assert!(child.get_method("m").is_some());
    assert!(child.has_method("m", 0));
    assert!(!child.has_method("m", 1));
    assert!(child.get_method("absent").is_none());

    // The nearest definition wins.
    let overriding = constant_method("m", &[], Statement::NumericConst(2));
    let child = Rc::new(Class::new("C".into(), vec![overriding], Some(parent)));
    let found = child.get_method("m").expect("Method is expected to exist.");
    assert_eq!(found.name, "m");
    let mut context = BufferedContext::new();
    let instance = ObjectHandle::own(Object::Instance(Instance::new(child)));
    let result = call_method(&instance, "m", Vec::new(), &mut context).unwrap();
    assert_eq!(result.as_number(), Some(2));
}

#[test]
fn shared_handles_observe_field_writes() {
    let class = empty_class("A");
    let instance = ObjectHandle::own(Object::Instance(Instance::new(class)));
    let view = instance.share();
    assert_eq!(instance.address(), view.address());

    instance
        .as_instance()
        .expect("Handle holds an instance.")
        .fields_mut()
        .insert("x".into(), number(7));
    let fields = view.as_instance().expect("Handle holds an instance.").fields();
    assert_eq!(fields.get("x").and_then(ObjectHandle::as_number), Some(7));
}

#[test]
fn call_method_rejects_non_instances() {
    let mut context = BufferedContext::new();
    assert_eq!(
        call_method(&number(5), "m", Vec::new(), &mut context),
        Err(RuntimeError::NotAnInstance("a number"))
    );
}

#[test]
fn call_method_checks_arity() {
    let method = constant_method("m", &[], Statement::NumericConst(1));
    let class = Rc::new(Class::new("A".into(), vec![method], None));
    let instance = ObjectHandle::own(Object::Instance(Instance::new(class)));
    let mut context = BufferedContext::new();
    assert_eq!(
        call_method(&instance, "m", vec![number(1)], &mut context),
        Err(RuntimeError::UndefinedMethod {
            class: "A".into(),
            method: "m".into(),
            arity: 1,
        })
    );
}

#[test]
fn rendering_primitives() {
    let mut context = BufferedContext::new();
    assert_eq!(render(&ObjectHandle::none(), &mut context).unwrap(), "None");
    assert_eq!(render(&number(-3), &mut context).unwrap(), "-3");
    assert_eq!(render(&boolean(true), &mut context).unwrap(), "True");
    assert_eq!(render(&boolean(false), &mut context).unwrap(), "False");
    assert_eq!(render(&string("raw"), &mut context).unwrap(), "raw");

    let class = empty_class("A");
    let handle = ObjectHandle::own(Object::Class(class.clone()));
    assert_eq!(render(&handle, &mut context).unwrap(), "Class A");

    let instance = ObjectHandle::own(Object::Instance(Instance::new(class)));
    let text = render(&instance, &mut context).unwrap();
    assert!(text.starts_with("<A instance at 0x"));
}

#[test]
fn rendering_uses_dunder_str() {
    let method = constant_method("__str__", &[], Statement::StringConst("pretty".into()));
    let class = Rc::new(Class::new("A".into(), vec![method], None));
    let instance = ObjectHandle::own(Object::Instance(Instance::new(class)));
    let mut context = BufferedContext::new();
    assert_eq!(render(&instance, &mut context).unwrap(), "pretty");
}

proptest! {
    #[test]
    fn equality_is_reflexive_and_symmetric(a in any::<i64>(), b in any::<i64>()) {
        let mut context = BufferedContext::new();
        prop_assert!(equal(&number(a), &number(a), &mut context).unwrap());
        prop_assert_eq!(
            equal(&number(a), &number(b), &mut context).unwrap(),
            equal(&number(b), &number(a), &mut context).unwrap()
        );
    }

    #[test]
    fn greater_mirrors_less(a in any::<i64>(), b in any::<i64>()) {
        let mut context = BufferedContext::new();
        prop_assert_eq!(
            greater(&number(a), &number(b), &mut context).unwrap(),
            less(&number(b), &number(a), &mut context).unwrap()
        );
    }

    #[test]
    fn derived_comparators_agree(a in any::<i64>(), b in any::<i64>()) {
        let mut context = BufferedContext::new();
        prop_assert_eq!(
            less_or_equal(&number(a), &number(b), &mut context).unwrap(),
            !greater(&number(a), &number(b), &mut context).unwrap()
        );
        prop_assert_eq!(
            greater_or_equal(&number(a), &number(b), &mut context).unwrap(),
            !less(&number(a), &number(b), &mut context).unwrap()
        );
    }
}
