use std::rc::Rc;

use compact_str::{CompactString, CompactStringExt, ToCompactString};

use super::error::RuntimeError;
use super::value::{
    self, call_method, is_true, render, Class, Closure, Instance, Object, ObjectHandle,
    ADD_METHOD, INIT_METHOD,
};
use super::{ProgramState, SystemContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

/// A node of the program tree. Statements and expressions share one
/// representation; every node executes to a handle.
#[derive(Debug, PartialEq)]
pub enum Statement {
    Assignment {
        name: CompactString,
        value: Box<Statement>,
    },
    /// A dotted identifier chain such as `self.point.x`.
    VariableValue {
        dotted_ids: Vec<CompactString>,
    },
    Print {
        args: Vec<Statement>,
    },
    MethodCall {
        object: Box<Statement>,
        method: CompactString,
        args: Vec<Statement>,
    },
    Stringify {
        argument: Box<Statement>,
    },
    Add {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Sub {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Mult {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Div {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Compound {
        statements: Vec<Statement>,
    },
    Return {
        value: Box<Statement>,
    },
    ClassDefinition {
        class: Rc<Class>,
    },
    FieldAssignment {
        object: Box<Statement>,
        field: CompactString,
        value: Box<Statement>,
    },
    IfElse {
        condition: Box<Statement>,
        if_body: Box<Statement>,
        else_body: Option<Box<Statement>>,
    },
    Or {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    And {
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    Not {
        argument: Box<Statement>,
    },
    Comparison {
        comparator: Comparator,
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },
    NewInstance {
        class: Rc<Class>,
        args: Option<Vec<Statement>>,
    },
    /// The boundary a contained `return` unwinds to.
    MethodBody {
        body: Box<Statement>,
    },
    StringConst(CompactString),
    NumericConst(i64),
    BoolConst(bool),
    NoneConst,
}

impl Statement {
    pub fn execute<C: SystemContext>(
        &self,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        match self {
            Statement::Assignment { name, value } => {
                let value = value.evaluate(closure, context)?;
                closure.insert(name.clone(), value.share());
                Ok(ProgramState::Completed(value))
            }
            Statement::VariableValue { dotted_ids } => {
                Self::execute_variable_value(dotted_ids, closure)
            }
            Statement::Print { args } => Self::execute_print(args, closure, context),
            Statement::MethodCall {
                object,
                method,
                args,
            } => Self::execute_method_call(object, method, args, closure, context),
            Statement::Stringify { argument } => {
                Self::execute_stringify(argument, closure, context)
            }
            Statement::Add { lhs, rhs } => Self::execute_add(lhs, rhs, closure, context),
            Statement::Sub { lhs, rhs } => {
                let (left, right) = Self::numeric_operands(lhs, rhs, closure, context)?;
                Ok(ProgramState::Completed(ObjectHandle::own(Object::Number(
                    left - right,
                ))))
            }
            Statement::Mult { lhs, rhs } => {
                let (left, right) = Self::numeric_operands(lhs, rhs, closure, context)?;
                Ok(ProgramState::Completed(ObjectHandle::own(Object::Number(
                    left * right,
                ))))
            }
            Statement::Div { lhs, rhs } => {
                let (left, right) = Self::numeric_operands(lhs, rhs, closure, context)?;
                if right == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                Ok(ProgramState::Completed(ObjectHandle::own(Object::Number(
                    left / right,
                ))))
            }
            Statement::Compound { statements } => {
                for statement in statements {
                    match statement.execute(closure, context)? {
                        ProgramState::Completed(_) => {}
                        state @ ProgramState::Return(_) => return Ok(state),
                    }
                }
                Ok(ProgramState::Completed(ObjectHandle::none()))
            }
            Statement::Return { value } => {
                let value = value.evaluate(closure, context)?;
                Ok(ProgramState::Return(value))
            }
            Statement::ClassDefinition { class } => {
                let handle = ObjectHandle::own(Object::Class(class.clone()));
                closure.insert(class.name().into(), handle.share());
                Ok(ProgramState::Completed(handle))
            }
            Statement::FieldAssignment {
                object,
                field,
                value,
            } => Self::execute_field_assignment(object, field, value, closure, context),
            Statement::IfElse {
                condition,
                if_body,
                else_body,
            } => {
                let condition = condition.evaluate(closure, context)?;
                if is_true(&condition) {
                    if_body.execute(closure, context)
                } else if let Some(else_body) = else_body {
                    else_body.execute(closure, context)
                } else {
                    Ok(ProgramState::Completed(ObjectHandle::none()))
                }
            }
            Statement::Or { lhs, rhs } => {
                if is_true(&lhs.evaluate(closure, context)?) {
                    return Ok(ProgramState::Completed(ObjectHandle::own(Object::Bool(
                        true,
                    ))));
                }
                let rhs = rhs.evaluate(closure, context)?;
                Ok(ProgramState::Completed(ObjectHandle::own(Object::Bool(
                    is_true(&rhs),
                ))))
            }
            Statement::And { lhs, rhs } => {
                if !is_true(&lhs.evaluate(closure, context)?) {
                    return Ok(ProgramState::Completed(ObjectHandle::own(Object::Bool(
                        false,
                    ))));
                }
                let rhs = rhs.evaluate(closure, context)?;
                Ok(ProgramState::Completed(ObjectHandle::own(Object::Bool(
                    is_true(&rhs),
                ))))
            }
            Statement::Not { argument } => {
                let value = argument.evaluate(closure, context)?;
                Ok(ProgramState::Completed(ObjectHandle::own(Object::Bool(
                    !is_true(&value),
                ))))
            }
            Statement::Comparison {
                comparator,
                lhs,
                rhs,
            } => Self::execute_comparison(*comparator, lhs, rhs, closure, context),
            Statement::NewInstance { class, args } => {
                Self::execute_new_instance(class, args.as_deref(), closure, context)
            }
            Statement::MethodBody { body } => match body.execute(closure, context)? {
                ProgramState::Return(value) => Ok(ProgramState::Completed(value)),
                ProgramState::Completed(_) => {
                    Ok(ProgramState::Completed(ObjectHandle::none()))
                }
            },
            Statement::StringConst(value) => Ok(ProgramState::Completed(ObjectHandle::own(
                Object::String(value.clone()),
            ))),
            Statement::NumericConst(value) => Ok(ProgramState::Completed(ObjectHandle::own(
                Object::Number(*value),
            ))),
            Statement::BoolConst(value) => Ok(ProgramState::Completed(ObjectHandle::own(
                Object::Bool(*value),
            ))),
            Statement::NoneConst => Ok(ProgramState::Completed(ObjectHandle::none())),
        }
    }

    /// Executes the statement and yields its value. A `return` surfacing
    /// here has escaped every method body, which is a runtime error.
    pub fn evaluate<C: SystemContext>(
        &self,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ObjectHandle, RuntimeError> {
        match self.execute(closure, context)? {
            ProgramState::Completed(value) => Ok(value),
            ProgramState::Return(_) => Err(RuntimeError::ReturnOutsideMethod),
        }
    }
}

impl Statement {
    fn execute_variable_value(
        dotted_ids: &[CompactString],
        closure: &mut Closure,
    ) -> Result<ProgramState, RuntimeError> {
        let mut ids = dotted_ids.iter();
        let name = ids
            .next()
            .expect("A variable path always has a leading identifier.");
        let mut result = closure
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedName(name.clone()))?
            .share();
        for field in ids {
            let Some(instance) = result.as_instance() else {
                return Err(RuntimeError::NotAnInstance(result.type_name()));
            };
            let next = instance
                .fields()
                .get(field)
                .map(ObjectHandle::share)
                .ok_or_else(|| RuntimeError::UndefinedField {
                    class: instance.class().name().into(),
                    field: field.clone(),
                })?;
            result = next;
        }
        Ok(ProgramState::Completed(result))
    }

    fn execute_print<C: SystemContext>(
        args: &[Statement],
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        let mut line = String::new();
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                line.push(' ');
            }
            let value = arg.evaluate(closure, context)?;
            // A string naming a binding in the current scope prints the
            // bound object instead of the string itself.
            let piece = match value.as_string() {
                Some(name) => match closure.get(name.as_str()).map(ObjectHandle::share) {
                    Some(bound) => render(&bound, context)?,
                    None => name.clone(),
                },
                None => render(&value, context)?,
            };
            line.push_str(&piece);
        }
        context.writeln(&line);
        Ok(ProgramState::Completed(ObjectHandle::none()))
    }

    fn execute_method_call<C: SystemContext>(
        object: &Statement,
        method: &str,
        args: &[Statement],
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        let object = object.evaluate(closure, context)?;
        let mut actual_args = Vec::with_capacity(args.len());
        for arg in args {
            actual_args.push(arg.evaluate(closure, context)?);
        }
        let result = call_method(&object, method, actual_args, context)?;
        Ok(ProgramState::Completed(result))
    }

    fn execute_stringify<C: SystemContext>(
        argument: &Statement,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        let value = argument.evaluate(closure, context)?;
        let text = match value.get() {
            None => CompactString::const_new("None"),
            Some(Object::Instance(_)) => render(&value, context)?,
            Some(Object::String(value)) => value.clone(),
            Some(Object::Bool(true)) => CompactString::const_new("True"),
            Some(Object::Bool(false)) => CompactString::const_new("False"),
            Some(Object::Number(value)) => value.to_compact_string(),
            Some(Object::Class(_)) => {
                return Err(RuntimeError::NoStringRepresentation(value.type_name()))
            }
        };
        Ok(ProgramState::Completed(ObjectHandle::own(Object::String(
            text,
        ))))
    }

    fn execute_add<C: SystemContext>(
        lhs: &Statement,
        rhs: &Statement,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        let lhs = lhs.evaluate(closure, context)?;
        let rhs = rhs.evaluate(closure, context)?;
        if lhs
            .as_instance()
            .is_some_and(|instance| instance.class().has_method(ADD_METHOD, 1))
        {
            let result = call_method(&lhs, ADD_METHOD, vec![rhs], context)?;
            return Ok(ProgramState::Completed(result));
        }
        if let (Some(left), Some(right)) = (lhs.as_string(), rhs.as_string()) {
            return Ok(ProgramState::Completed(ObjectHandle::own(Object::String(
                [left, right].concat_compact(),
            ))));
        }
        if let (Some(left), Some(right)) = (lhs.as_number(), rhs.as_number()) {
            return Ok(ProgramState::Completed(ObjectHandle::own(Object::Number(
                left + right,
            ))));
        }
        Err(RuntimeError::NonAddable(lhs.type_name(), rhs.type_name()))
    }

    fn numeric_operands<C: SystemContext>(
        lhs: &Statement,
        rhs: &Statement,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<(i64, i64), RuntimeError> {
        let lhs = lhs.evaluate(closure, context)?;
        let rhs = rhs.evaluate(closure, context)?;
        match (lhs.as_number(), rhs.as_number()) {
            (Some(left), Some(right)) => Ok((left, right)),
            _ => Err(RuntimeError::NonNumerics(lhs.type_name(), rhs.type_name())),
        }
    }

    fn execute_field_assignment<C: SystemContext>(
        object: &Statement,
        field: &CompactString,
        value: &Statement,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        let object = object.evaluate(closure, context)?;
        let Some(instance) = object.as_instance() else {
            return Err(RuntimeError::NotAnInstance(object.type_name()));
        };
        let value = value.evaluate(closure, context)?;
        // Take the fields borrow only after the right hand side has run.
        instance.fields_mut().insert(field.clone(), value.share());
        Ok(ProgramState::Completed(value))
    }

    fn execute_comparison<C: SystemContext>(
        comparator: Comparator,
        lhs: &Statement,
        rhs: &Statement,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        let lhs = lhs.evaluate(closure, context)?;
        let rhs = rhs.evaluate(closure, context)?;
        let result = match comparator {
            Comparator::Equal => value::equal(&lhs, &rhs, context)?,
            Comparator::NotEqual => value::not_equal(&lhs, &rhs, context)?,
            Comparator::Less => value::less(&lhs, &rhs, context)?,
            Comparator::Greater => value::greater(&lhs, &rhs, context)?,
            Comparator::LessOrEqual => value::less_or_equal(&lhs, &rhs, context)?,
            Comparator::GreaterOrEqual => value::greater_or_equal(&lhs, &rhs, context)?,
        };
        Ok(ProgramState::Completed(ObjectHandle::own(Object::Bool(
            result,
        ))))
    }

    fn execute_new_instance<C: SystemContext>(
        class: &Rc<Class>,
        args: Option<&[Statement]>,
        closure: &mut Closure,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        let instance = ObjectHandle::own(Object::Instance(Instance::new(class.clone())));
        if let Some(args) = args {
            if class.has_method(INIT_METHOD, args.len()) {
                let mut actual_args = Vec::with_capacity(args.len());
                for arg in args {
                    actual_args.push(arg.evaluate(closure, context)?);
                }
                call_method(&instance, INIT_METHOD, actual_args, context)?;
            }
        }
        Ok(ProgramState::Completed(instance))
    }
}
