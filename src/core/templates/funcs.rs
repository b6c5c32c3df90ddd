//! Named callables made available inside template bodies.

use std::{collections::BTreeMap, collections::HashMap, fmt, sync::Arc};

use tera::{Filter, Function, Tera, Value};

/// Mapping from name to callable, registered on every template set a recipe
/// builds.
///
/// Functions are called as `{{ name(arg=value) }}`, filters as
/// `{{ value | name }}`. Both are reference counted so a recipe can be rebuilt
/// on every render without cloning the callables themselves.
#[derive(Clone, Default)]
pub struct FuncMap {
    functions: BTreeMap<String, Arc<dyn Function>>,
    filters: BTreeMap<String, Arc<dyn Filter>>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a global function
    pub fn function<F: Function + 'static>(mut self, name: &str, function: F) -> Self {
        self.functions.insert(name.to_string(), Arc::new(function));
        self
    }

    /// Add a filter
    pub fn filter<F: Filter + 'static>(mut self, name: &str, filter: F) -> Self {
        self.filters.insert(name.to_string(), Arc::new(filter));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.filters.is_empty()
    }

    /// Names of every registered function and filter
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions
            .keys()
            .chain(self.filters.keys())
            .map(String::as_str)
    }

    /// Register every callable on `tera`. Must run before templates are added.
    pub fn apply(&self, tera: &mut Tera) {
        for (name, function) in &self.functions {
            tera.register_function(name, SharedFunction(Arc::clone(function)));
        }
        for (name, filter) in &self.filters {
            tera.register_filter(name, SharedFilter(Arc::clone(filter)));
        }
    }
}

/// Forwards to a shared function, keeping its `is_safe` marker
struct SharedFunction(Arc<dyn Function>);

impl Function for SharedFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.call(args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

/// Forwards to a shared filter, keeping its `is_safe` marker
struct SharedFilter(Arc<dyn Filter>);

impl Filter for SharedFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.filter(value, args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

impl fmt::Debug for FuncMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncMap")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    fn shout(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let text = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("shout expects a string"))?;
        Ok(Value::String(text.to_uppercase()))
    }

    fn greeting(args: &HashMap<String, Value>) -> tera::Result<Value> {
        let who = args.get("who").and_then(Value::as_str).unwrap_or("world");
        Ok(Value::String(format!("hello, {who}")))
    }

    #[test]
    fn test_apply_registers_functions_and_filters() {
        let funcs = FuncMap::new()
            .function("greeting", greeting)
            .filter("shout", shout);

        let mut tera = Tera::default();
        funcs.apply(&mut tera);
        tera.add_raw_template("t", "{{ greeting(who=name) | shout }}")
            .unwrap();

        let mut context = Context::new();
        context.insert("name", "gopher");
        assert_eq!(tera.render("t", &context).unwrap(), "HELLO, GOPHER");
    }

    struct Bold;

    impl Filter for Bold {
        fn filter(&self, value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
            Ok(Value::String(format!(
                "<b>{}</b>",
                value.as_str().unwrap_or_default()
            )))
        }

        fn is_safe(&self) -> bool {
            true
        }
    }

    struct Badge;

    impl Function for Badge {
        fn call(&self, _: &HashMap<String, Value>) -> tera::Result<Value> {
            Ok(Value::String("<i>new</i>".to_string()))
        }

        fn is_safe(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_safe_callables_skip_autoescape() {
        let funcs = FuncMap::new().function("badge", Badge).filter("bold", Bold);

        let mut tera = Tera::default();
        tera.autoescape_on(vec![""]);
        funcs.apply(&mut tera);
        tera.add_raw_template("t", "{{ 'hi' | bold }} {{ badge() }} {{ raw }}")
            .unwrap();

        let mut context = Context::new();
        context.insert("raw", "<u>");
        assert_eq!(
            tera.render("t", &context).unwrap(),
            "<b>hi</b> <i>new</i> &lt;u&gt;"
        );
    }

    #[test]
    fn test_names_and_empty() {
        assert!(FuncMap::new().is_empty());

        let funcs = FuncMap::new()
            .function("greeting", greeting)
            .filter("shout", shout);
        assert!(!funcs.is_empty());
        assert_eq!(funcs.names().collect::<Vec<_>>(), vec!["greeting", "shout"]);
    }

    #[test]
    fn test_clone_shares_callables() {
        let funcs = FuncMap::new().filter("shout", shout);
        let copy = funcs.clone();

        for map in [funcs, copy] {
            let mut tera = Tera::default();
            map.apply(&mut tera);
            tera.add_raw_template("t", "{{ 'hi' | shout }}").unwrap();
            assert_eq!(tera.render("t", &Context::new()).unwrap(), "HI");
        }
    }
}
