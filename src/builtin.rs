use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    environment::Environment,
    object::{BuiltinFn, HashPair, Object},
};

/// Native function registry. Consulted only after identifier lookup misses
/// in the environment chain, so user bindings always shadow builtins. Held
/// by the evaluator as an injected dependency rather than a process global.
pub struct Builtins {
    table: HashMap<&'static str, BuiltinFn>,
}

impl Builtins {
    pub fn standard() -> Self {
        let mut table: HashMap<&'static str, BuiltinFn> = HashMap::new();
        table.insert("len", builtin_len);
        table.insert("max", builtin_max);
        table.insert("first", builtin_first);
        table.insert("last", builtin_last);
        table.insert("rest", builtin_rest);
        table.insert("push", builtin_push);
        table.insert("puts", builtin_puts);
        table.insert("grep", builtin_grep);
        table.insert("defined", builtin_defined);
        table.insert("exists", builtin_exists);
        table.insert("printwords", builtin_printwords);
        table.insert("wc", builtin_wordcount);
        table.insert("wordcount", builtin_wordcount);
        table.insert("refcount", builtin_refcount);
        table.insert("cptcount", builtin_cptcount);
        table.insert("trcount", builtin_trcount);
        table.insert("mecount", builtin_mecount);
        table.insert("thoughts", builtin_thoughts);
        table.insert("quotes", builtin_quotes);
        table.insert("counts", builtin_counts);
        Self { table }
    }

    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &'static str, func: BuiltinFn) {
        self.table.insert(name, func);
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.table
            .get_key_value(name)
            .map(|(name, func)| Object::Builtin {
                name: *name,
                func: *func,
            })
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

fn new_error(message: String) -> Object {
    Object::Error(message)
}

fn expect_arity(args: &[Object], want: usize) -> Option<Object> {
    if args.len() != want {
        return Some(new_error(format!(
            "wrong number of arguments. got={}, want={}",
            args.len(),
            want
        )));
    }
    None
}

fn builtin_len(_env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 1) {
        return error;
    }

    match &args[0] {
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        Object::Str(value) => Object::Integer(value.len() as i64),
        Object::Hash(pairs) => Object::Integer(pairs.len() as i64),
        other => new_error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

fn builtin_max(_env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if args.is_empty() {
        return new_error("wrong number of arguments. got=0, want=1".to_owned());
    }

    let mut max = i64::MIN;
    for arg in &args {
        match arg {
            Object::Integer(value) => max = max.max(*value),
            other => {
                return new_error(format!(
                    "argument to `max` not supported, got {}",
                    other.type_name()
                ))
            }
        }
    }

    Object::Integer(max)
}

fn builtin_first(_env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    match args.as_slice() {
        [Object::Array(elements)] => elements.first().cloned().unwrap_or(Object::Null),
        [other] => new_error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.type_name()
        )),
        _ => new_error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )),
    }
}

fn builtin_last(_env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    match args.as_slice() {
        [Object::Array(elements)] => elements.last().cloned().unwrap_or(Object::Null),
        [other] => new_error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.type_name()
        )),
        _ => new_error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )),
    }
}

fn builtin_rest(_env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    match args.as_slice() {
        [Object::Array(elements)] => {
            if elements.is_empty() {
                Object::Null
            } else {
                Object::array(elements[1..].to_vec())
            }
        }
        [other] => new_error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.type_name()
        )),
        _ => new_error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )),
    }
}

fn builtin_push(_env: &Rc<RefCell<Environment>>, mut args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 2) {
        return error;
    }

    let value = args.swap_remove(1);
    match args.swap_remove(0) {
        Object::Array(elements) => {
            let mut elements = elements.as_ref().clone();
            elements.push(value);
            Object::array(elements)
        }
        other => new_error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn builtin_puts(_env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    for arg in &args {
        println!("{}", arg);
    }
    Object::Null
}

/// Matches against the caller's local bindings only; closures deliberately
/// do not leak outer names into the result.
fn builtin_grep(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 1) {
        return error;
    }

    let needle = match &args[0] {
        Object::Str(value) => value,
        other => {
            return new_error(format!(
                "argument to `grep` must be STRING, got {}",
                other.type_name()
            ))
        }
    };

    let matches = env
        .borrow()
        .store()
        .keys()
        .filter(|name| name.contains(needle.as_str()))
        .map(|name| Object::Str(name.clone()))
        .collect();

    Object::array(matches)
}

/// True when the name is bound and, for a word record, carries a non-empty
/// definition.
fn builtin_defined(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 1) {
        return error;
    }

    let name = match &args[0] {
        Object::Str(value) => value,
        other => {
            return new_error(format!(
                "argument to `defined` must be STRING, got {}",
                other.type_name()
            ))
        }
    };

    let defined = match env.borrow().get(name) {
        None => false,
        Some(Object::Word { definition, .. }) => !definition.is_empty(),
        Some(_) => true,
    };

    Object::Boolean(defined)
}

fn builtin_exists(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 1) {
        return error;
    }

    let name = match &args[0] {
        Object::Str(value) => value,
        other => {
            return new_error(format!(
                "argument to `exists` must be STRING, got {}",
                other.type_name()
            ))
        }
    };

    Object::Boolean(env.borrow().get(name).is_some())
}

fn builtin_printwords(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }

    for value in env.borrow().store().values() {
        if matches!(value, Object::Word { .. }) {
            println!("{}", value);
        }
    }
    Object::Null
}

fn count_local(env: &Rc<RefCell<Environment>>, matcher: fn(&Object) -> bool) -> i64 {
    env.borrow().store().values().filter(|v| matcher(v)).count() as i64
}

fn builtin_wordcount(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }
    Object::Integer(count_local(env, |v| matches!(v, Object::Word { .. })))
}

fn builtin_refcount(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }
    Object::Integer(count_local(env, |v| matches!(v, Object::Reference { .. })))
}

fn builtin_cptcount(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }
    Object::Integer(count_local(env, |v| matches!(v, Object::Concept { .. })))
}

fn builtin_trcount(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }
    Object::Integer(count_local(env, |v| matches!(v, Object::Translation { .. })))
}

fn builtin_mecount(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }
    Object::Integer(env.borrow().thoughts().len() as i64)
}

fn builtin_thoughts(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }

    let thoughts = env
        .borrow()
        .thoughts()
        .iter()
        .map(|thought| Object::Str(thought.clone()))
        .collect();
    Object::array(thoughts)
}

fn builtin_quotes(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }
    Object::array(env.borrow().quotes().to_vec())
}

/// One-hash summary of the session. Every field gets its own string key.
fn builtin_counts(env: &Rc<RefCell<Environment>>, args: Vec<Object>) -> Object {
    if let Some(error) = expect_arity(&args, 0) {
        return error;
    }

    let fields = [
        ("words", count_local(env, |v| matches!(v, Object::Word { .. }))),
        (
            "refs",
            count_local(env, |v| matches!(v, Object::Reference { .. })),
        ),
        (
            "cpts",
            count_local(env, |v| matches!(v, Object::Concept { .. })),
        ),
        (
            "trs",
            count_local(env, |v| matches!(v, Object::Translation { .. })),
        ),
        ("thoughts", env.borrow().thoughts().len() as i64),
        ("quotes", env.borrow().quotes().len() as i64),
    ];

    let mut pairs = HashMap::new();
    for (name, count) in fields {
        let key = Object::Str(name.to_owned());
        if let Some(hash_key) = key.hash_key() {
            pairs.insert(
                hash_key,
                HashPair {
                    key,
                    value: Object::Integer(count),
                },
            );
        }
    }

    Object::hash(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Rc<RefCell<Environment>> {
        Environment::new()
    }

    fn word(name: &str, definition: &str) -> Object {
        Object::Word {
            name: name.to_owned(),
            definition: definition.to_owned(),
        }
    }

    #[test]
    fn len_supported_types() {
        let env = env();
        assert_eq!(
            builtin_len(&env, vec![Object::Str("hello".to_owned())]),
            Object::Integer(5)
        );
        assert_eq!(
            builtin_len(&env, vec![Object::array(vec![Object::Null; 3])]),
            Object::Integer(3)
        );
        assert_eq!(
            builtin_len(&env, vec![Object::hash(HashMap::new())]),
            Object::Integer(0)
        );
        assert_eq!(
            builtin_len(&env, vec![Object::Integer(1)]),
            Object::Error("argument to `len` not supported, got INTEGER".to_owned())
        );
        assert_eq!(
            builtin_len(&env, vec![]),
            Object::Error("wrong number of arguments. got=0, want=1".to_owned())
        );
    }

    #[test]
    fn max_of_integers() {
        let env = env();
        assert_eq!(
            builtin_max(
                &env,
                vec![Object::Integer(3), Object::Integer(9), Object::Integer(-4)]
            ),
            Object::Integer(9)
        );
        assert_eq!(
            builtin_max(&env, vec![Object::Integer(1), Object::Str("x".to_owned())]),
            Object::Error("argument to `max` not supported, got STRING".to_owned())
        );
        assert_eq!(
            builtin_max(&env, vec![]),
            Object::Error("wrong number of arguments. got=0, want=1".to_owned())
        );
    }

    #[test]
    fn first_last_rest_on_arrays() {
        let env = env();
        let arr = Object::array(vec![
            Object::Integer(1),
            Object::Integer(2),
            Object::Integer(3),
        ]);

        assert_eq!(builtin_first(&env, vec![arr.clone()]), Object::Integer(1));
        assert_eq!(builtin_last(&env, vec![arr.clone()]), Object::Integer(3));
        assert_eq!(
            builtin_rest(&env, vec![arr]),
            Object::array(vec![Object::Integer(2), Object::Integer(3)])
        );

        let empty = Object::array(vec![]);
        assert_eq!(builtin_first(&env, vec![empty.clone()]), Object::Null);
        assert_eq!(builtin_last(&env, vec![empty.clone()]), Object::Null);
        assert_eq!(builtin_rest(&env, vec![empty]), Object::Null);

        assert_eq!(
            builtin_first(&env, vec![Object::Integer(1)]),
            Object::Error("argument to `first` must be ARRAY, got INTEGER".to_owned())
        );
    }

    #[test]
    fn push_and_rest_leave_the_original_untouched() {
        let env = env();
        let original = vec![Object::Integer(1), Object::Integer(2)];

        let pushed = builtin_push(
            &env,
            vec![Object::array(original.clone()), Object::Integer(3)],
        );
        assert_eq!(
            pushed,
            Object::array(vec![
                Object::Integer(1),
                Object::Integer(2),
                Object::Integer(3)
            ])
        );

        let rest = builtin_rest(&env, vec![Object::array(original.clone())]);
        assert_eq!(rest, Object::array(vec![Object::Integer(2)]));

        assert_eq!(original.len(), 2);
    }

    #[test]
    fn push_rejects_non_arrays() {
        let env = env();
        assert_eq!(
            builtin_push(&env, vec![Object::Integer(1), Object::Integer(2)]),
            Object::Error("argument to `push` must be ARRAY, got INTEGER".to_owned())
        );
        assert_eq!(
            builtin_push(&env, vec![Object::array(vec![])]),
            Object::Error("wrong number of arguments. got=1, want=2".to_owned())
        );
    }

    #[test]
    fn grep_matches_local_names_only() {
        let outer = env();
        outer.borrow_mut().set("wordy_outer", Object::Integer(1));

        let inner = Environment::new_enclosed(outer);
        inner.borrow_mut().set("word_one", Object::Integer(1));
        inner.borrow_mut().set("other", Object::Integer(2));

        let result = builtin_grep(&inner, vec![Object::Str("word".to_owned())]);
        match result {
            Object::Array(names) => {
                assert_eq!(*names, vec![Object::Str("word_one".to_owned())]);
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn defined_requires_a_nonempty_word_definition() {
        let env = env();
        env.borrow_mut().set("cat", word("cat", "a small feline"));
        env.borrow_mut().set("dog", word("dog", ""));
        env.borrow_mut().set("n", Object::Integer(1));

        let check = |name: &str| builtin_defined(&env, vec![Object::Str(name.to_owned())]);
        assert_eq!(check("cat"), Object::Boolean(true));
        assert_eq!(check("dog"), Object::Boolean(false));
        assert_eq!(check("n"), Object::Boolean(true));
        assert_eq!(check("missing"), Object::Boolean(false));
    }

    #[test]
    fn exists_checks_binding_presence() {
        let env = env();
        env.borrow_mut().set("dog", word("dog", ""));

        assert_eq!(
            builtin_exists(&env, vec![Object::Str("dog".to_owned())]),
            Object::Boolean(true)
        );
        assert_eq!(
            builtin_exists(&env, vec![Object::Str("cat".to_owned())]),
            Object::Boolean(false)
        );
    }

    #[test]
    fn variant_counts() {
        let env = env();
        env.borrow_mut().set("cat", word("cat", "a small feline"));
        env.borrow_mut().set("dog", word("dog", "a loyal canine"));
        env.borrow_mut().set(
            "rfc",
            Object::Reference {
                name: "rfc".to_owned(),
                definition: "see also".to_owned(),
            },
        );
        env.borrow_mut().add_thought("hm");

        assert_eq!(builtin_wordcount(&env, vec![]), Object::Integer(2));
        assert_eq!(builtin_refcount(&env, vec![]), Object::Integer(1));
        assert_eq!(builtin_cptcount(&env, vec![]), Object::Integer(0));
        assert_eq!(builtin_trcount(&env, vec![]), Object::Integer(0));
        assert_eq!(builtin_mecount(&env, vec![]), Object::Integer(1));
    }

    #[test]
    fn thoughts_and_quotes_return_the_logs() {
        let env = env();
        env.borrow_mut().add_thought("first");
        env.borrow_mut().add_quote(Object::Integer(7));

        assert_eq!(
            builtin_thoughts(&env, vec![]),
            Object::array(vec![Object::Str("first".to_owned())])
        );
        assert_eq!(
            builtin_quotes(&env, vec![]),
            Object::array(vec![Object::Integer(7)])
        );
    }

    #[test]
    fn counts_uses_a_distinct_key_per_field() {
        let env = env();
        env.borrow_mut().set("cat", word("cat", "a small feline"));
        env.borrow_mut().add_thought("hm");
        env.borrow_mut().add_quote(Object::Integer(1));

        let summary = builtin_counts(&env, vec![]);
        let pairs = match summary {
            Object::Hash(pairs) => pairs,
            other => panic!("expected hash, got {:?}", other),
        };

        assert_eq!(pairs.len(), 6);

        let lookup = |name: &str| {
            let key = Object::Str(name.to_owned()).hash_key().unwrap();
            pairs[&key].value.clone()
        };
        assert_eq!(lookup("words"), Object::Integer(1));
        assert_eq!(lookup("refs"), Object::Integer(0));
        assert_eq!(lookup("cpts"), Object::Integer(0));
        assert_eq!(lookup("trs"), Object::Integer(0));
        assert_eq!(lookup("thoughts"), Object::Integer(1));
        assert_eq!(lookup("quotes"), Object::Integer(1));
    }

    #[test]
    fn registry_lookup_returns_builtin_objects() {
        let builtins = Builtins::standard();
        match builtins.get("len") {
            Some(Object::Builtin { name, .. }) => assert_eq!(name, "len"),
            other => panic!("expected builtin, got {:?}", other),
        }
        assert!(builtins.get("missing").is_none());
    }
}
