use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope. Closures hold one, which keeps the scope alive
/// after the block that created it has exited.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope instance: its bindings plus a link to the scope it is
/// nested in. The global scope is the only one without `enclosing`.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wraps `self` in a fresh shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Binds `name` in this scope, replacing any earlier binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Looks `name` up along the whole chain, innermost first.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Assigns to the innermost existing binding of `name` along the chain.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Follows exactly `distance` enclosing links from `env`.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current = Rc::clone(env);

        for _ in 0..distance {
            let next = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    /// Reads `name` from the scope exactly `distance` hops out, without
    /// searching past it.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        debug!("get_at '{}' distance {}", name.lexeme, distance);

        Self::ancestor(env, distance)
            .and_then(|scope| scope.borrow().values.get(&name.lexeme).cloned())
            .ok_or_else(|| undefined(name))
    }

    /// Writes `name` in the scope exactly `distance` hops out.
    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        debug!("assign_at '{}' distance {}", name.lexeme, distance);

        let scope = Self::ancestor(env, distance).ok_or_else(|| undefined(name))?;
        let mut scope = scope.borrow_mut();

        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, None, 1)
    }

    #[test]
    fn get_walks_to_enclosing_scope() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));

        let inner = Environment::with_enclosing(Rc::clone(&global));

        assert_eq!(inner.get(&ident("a")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn get_at_does_not_search_past_target_scope() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));

        let middle = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        middle.borrow_mut().define("a", Value::Number(2.0));

        let inner = Environment::with_enclosing(Rc::clone(&middle)).into_ref();

        assert_eq!(
            Environment::get_at(&inner, 1, &ident("a")).unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            Environment::get_at(&inner, 2, &ident("a")).unwrap(),
            Value::Number(1.0)
        );
        assert!(Environment::get_at(&inner, 0, &ident("a")).is_err());
    }

    #[test]
    fn assign_at_updates_only_the_target_scope() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("x", Value::Number(1.0));

        let inner = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        inner.borrow_mut().define("x", Value::Number(10.0));

        Environment::assign_at(&inner, 1, &ident("x"), Value::Number(5.0)).unwrap();

        assert_eq!(outer.borrow().get(&ident("x")).unwrap(), Value::Number(5.0));
        assert_eq!(inner.borrow().get(&ident("x")).unwrap(), Value::Number(10.0));
    }

    #[test]
    fn undefined_variable_reports_name() {
        let env = Environment::new();
        let err = env.get(&ident("missing")).unwrap_err();

        assert_eq!(err.message, "Undefined variable 'missing'.");
    }

    #[test]
    fn assign_to_undefined_is_an_error() {
        let mut env = Environment::new();

        assert!(env.assign(&ident("nope"), Value::Nil).is_err());
    }
}
