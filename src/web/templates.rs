use minijinja::Environment;
use serde::Serialize;
use tracing::error;

pub fn init_templates() -> Environment<'static> {
    let mut env = Environment::new();

    // Register built-in templates
    env.add_template("index.html", include_str!("../../templates/index.html"))
        .expect("Failed to add index template");
    env.add_template("error.html", include_str!("../../templates/error.html"))
        .expect("Failed to add error template");

    env
}

pub fn render_template<S: Serialize>(env: &Environment, template_name: &str, context: S) -> String {
    match env.get_template(template_name) {
        Ok(tmpl) => match tmpl.render(context) {
            Ok(result) => result,
            Err(e) => {
                error!("Template render error: {}", e);
                format!("<h1>Template Error</h1><p>{}</p>", e)
            }
        },
        Err(e) => {
            error!("Template not found: {} ({})", template_name, e);
            format!("<h1>Template Not Found</h1><p>{}: {}</p>", template_name, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_error_template_renders_message() {
        let env = init_templates();
        let html = render_template(&env, "error.html", context! { status => 404, message => "Page not found" });
        assert!(html.contains("404"));
        assert!(html.contains("Page not found"));
    }

    #[test]
    fn test_missing_template_is_reported() {
        let env = init_templates();
        let html = render_template(&env, "nope.html", context! {});
        assert!(html.contains("Template Not Found"));
    }
}
