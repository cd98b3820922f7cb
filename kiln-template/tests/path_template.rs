//! Path-template layouts as configured in real Kilnfiles.

use kiln_core::{Requirement, Stemcell};
use kiln_template::{PathTemplate, TemplateContext, TemplateError};

fn plan9() -> Stemcell {
    Stemcell {
        os: "plan9".into(),
        version: "42".into(),
    }
}

#[test]
fn stemcell_qualified_layout() {
    let template = PathTemplate::parse(
        "{{ name }}/{{ name }}-{{ version }}-{{ stemcell_os }}-{{ stemcell_version }}.tgz",
    )
    .expect("parse");
    let req = Requirement::new("bob", "2.0").with_stemcell(&plan9());
    assert_eq!(template.expand(&req).expect("expand"), "bob/bob-2.0-plan9-42.tgz");
}

#[test]
fn upload_layout_ignores_missing_stemcell() {
    let template = PathTemplate::parse("{{ name }}/{{ name }}-{{ version }}.tgz").expect("parse");
    let req = Requirement::new("banana", "1.2.3");
    assert_eq!(template.expand(&req).expect("expand"), "banana/banana-1.2.3.tgz");
}

#[test]
fn render_accepts_explicit_context() {
    let template = PathTemplate::parse("{{ stemcell_os }}/{{ name }}").expect("parse");
    let ctx = TemplateContext {
        name: "uaa".into(),
        version: "1".into(),
        stemcell_os: "windows2019".into(),
        stemcell_version: "2019.7".into(),
    };
    assert_eq!(template.render(&ctx).expect("render"), "windows2019/uaa");
}

#[test]
fn template_text_is_preserved_in_errors() {
    let source = "{{ name }}/{{ Name }}";
    let template = PathTemplate::parse(source).expect("parse");
    assert_eq!(template.as_str(), source);

    let err = template.expand(&Requirement::new("uaa", "1")).unwrap_err();
    match &err {
        TemplateError::Evaluate { template, message } => {
            assert_eq!(template, source);
            assert!(message.contains("Name"), "got: {message}");
        }
        other => panic!("expected evaluate error, got {other:?}"),
    }
}
