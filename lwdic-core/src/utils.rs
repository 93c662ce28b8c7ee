//! Utility functions for the container

/// Naming helpers for lookup keys and namespaces
pub mod naming {
    /// Returns the namespace part of a qualified type name.
    ///
    /// Generic arguments and the `dyn ` prefix of trait objects are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use lwdic_core::utils::naming::namespace_of;
    ///
    /// assert_eq!(namespace_of("app::service::UserService"), "app::service");
    /// assert_eq!(namespace_of("dyn app::api::Greeter"), "app::api");
    /// assert_eq!(namespace_of("app::Wrapper<other::Inner>"), "app");
    /// assert_eq!(namespace_of("i32"), "");
    /// ```
    pub fn namespace_of(qualified_name: &str) -> &str {
        let name = qualified_name.strip_prefix("dyn ").unwrap_or(qualified_name);
        let name = match name.find('<') {
            Some(generic_start) => &name[..generic_start],
            None => name,
        };
        match name.rfind("::") {
            Some(separator) => &name[..separator],
            None => "",
        }
    }

    /// Returns the last path segment of a qualified type name, for log output.
    ///
    /// # Examples
    ///
    /// ```
    /// use lwdic_core::utils::naming::short_type_name;
    ///
    /// assert_eq!(short_type_name("app::service::UserService"), "UserService");
    /// assert_eq!(short_type_name("dyn app::api::Greeter"), "dyn Greeter");
    /// assert_eq!(short_type_name("i32"), "i32");
    /// ```
    pub fn short_type_name(qualified_name: &str) -> String {
        let (prefix, name) = match qualified_name.strip_prefix("dyn ") {
            Some(stripped) => ("dyn ", stripped),
            None => ("", qualified_name),
        };
        let namespace = namespace_of(name);
        let short = if namespace.is_empty() {
            name
        } else {
            &name[namespace.len() + 2..]
        };
        format!("{prefix}{short}")
    }

    /// Checks whether a module path lies inside a namespace.
    ///
    /// A namespace contains itself and every nested module; an empty
    /// namespace contains everything.
    ///
    /// # Examples
    ///
    /// ```
    /// use lwdic_core::utils::naming::is_within_namespace;
    ///
    /// assert!(is_within_namespace("app::service", "app"));
    /// assert!(is_within_namespace("app", "app"));
    /// assert!(!is_within_namespace("application", "app"));
    /// assert!(is_within_namespace("anything", ""));
    /// ```
    pub fn is_within_namespace(module_path: &str, namespace: &str) -> bool {
        if namespace.is_empty() || module_path == namespace {
            return true;
        }
        module_path
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with("::"))
    }
}

#[cfg(test)]
mod tests {
    use super::naming::*;

    #[test]
    fn test_namespace_of_nested_generics() {
        assert_eq!(
            namespace_of("app::Repo<app::model::User, alloc::string::String>"),
            "app"
        );
    }

    #[test]
    fn test_namespace_with_trailing_separator() {
        assert!(!is_within_namespace("app::service", "app::serv"));
        assert!(is_within_namespace("app::service::impls", "app::service"));
    }

    #[test]
    fn test_short_type_name_of_generic() {
        assert_eq!(short_type_name("app::Wrapper<app::Inner>"), "Wrapper<app::Inner>");
    }
}
