use super::*;
use crate::cli::NewArgs;
use crate::test_support::{
    create_fragments_dir, create_template_dir, create_template_repo, make_repo, DirGuard,
};
use serial_test::serial;
use tempfile::TempDir;

/// Everything one `sprig new` invocation needs on disk: a template repo, a
/// fragments directory, and a workspace holding sprig.yaml + ports.yaml.
struct Workspace {
    dir: TempDir,
    config_path: PathBuf,
    _template: TempDir,
    _fragments: TempDir,
}

impl Workspace {
    fn registry_path(&self) -> PathBuf {
        self.dir.path().join("ports.yaml")
    }
}

fn setup() -> Workspace {
    let template = create_template_repo();
    setup_with_template(template)
}

fn setup_with_template(template: TempDir) -> Workspace {
    let fragments = create_fragments_dir();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("sprig.yaml");
    let yaml = format!(
        "template_repo: {}\nfragments_dir: {}\nport_registry: {}\n",
        template.path().display(),
        fragments.path().display(),
        dir.path().join("ports.yaml").display(),
    );
    std::fs::write(&config_path, yaml).unwrap();
    Workspace {
        dir,
        config_path,
        _template: template,
        _fragments: fragments,
    }
}

fn base_args(ws: &Workspace) -> NewArgs {
    NewArgs {
        name: "currency-service".to_string(),
        domain: "currency".to_string(),
        port: 8082,
        database: None,
        addons: Vec::new(),
        dir: Some(ws.dir.path().to_path_buf()),
        template: None,
        config: ws.config_path.clone(),
        java_version: None,
        commons_version: None,
        github: false,
        no_git: true,
    }
}

#[test]
fn composes_a_service_end_to_end() {
    let ws = setup();
    let mut args = base_args(&ws);
    args.addons = vec!["web".to_string(), "postgresql".to_string()];
    args.database = Some("currency_db".to_string());

    cmd_new(args).unwrap();

    let target = ws.dir.path().join("currency-service");
    assert!(target.is_dir());

    // Substitution and renames landed on disk.
    let settings = std::fs::read_to_string(target.join("settings.gradle")).unwrap();
    assert_eq!(settings, "rootProject.name = 'currency-service'\n");
    assert!(
        target
            .join("src/main/java/demo/currency/CurrencyApplication.java")
            .is_file()
    );
    assert!(
        !target
            .join("src/main/java/demo/[[domain]]")
            .exists()
    );

    // web renamed the commons library.
    let catalog = std::fs::read_to_string(target.join("gradle/libs.versions.toml")).unwrap();
    assert!(!catalog.contains("commons-core"));
    assert!(catalog.contains("commons-web"));

    // postgresql merged its fragments.
    let runtime =
        std::fs::read_to_string(target.join("src/main/resources/application.yaml")).unwrap();
    assert!(runtime.contains("jdbc:postgresql://localhost:5432/currency_db"));
    assert!(
        target
            .join("src/main/resources/db/migration/V001__create_schema.sql")
            .is_file()
    );

    // Smoke test with one container.
    let smoke = std::fs::read_to_string(
        target.join("src/test/java/demo/currency/CurrencyApplicationTests.java"),
    )
    .unwrap();
    assert_eq!(smoke.matches("@Container").count(), 1);
    assert!(smoke.contains(".withDatabaseName(\"currency_db\")"));

    // Port registered.
    let registry = std::fs::read_to_string(ws.registry_path()).unwrap();
    assert!(registry.contains("currency-service: 8082"));

    // --no-git: no history on the composed tree.
    assert!(!target.join(".git").exists());
}

#[test]
fn rejects_invalid_name_before_any_filesystem_mutation() {
    let ws = setup();
    let mut args = base_args(&ws);
    args.name = "Foo-service".to_string();

    let err = cmd_new(args).unwrap_err();

    assert!(matches!(err, SprigError::Validation(_)));
    assert!(!ws.dir.path().join("Foo-service").exists());
    assert!(!ws.registry_path().exists());
}

#[test]
fn rejects_port_already_in_the_registry() {
    let ws = setup();
    std::fs::write(ws.registry_path(), "billing-service: 8082\n").unwrap();
    let args = base_args(&ws);

    let err = cmd_new(args).unwrap_err();

    assert!(matches!(err, SprigError::Validation(_)));
    assert!(err.to_string().contains("billing-service"));
    assert!(!ws.dir.path().join("currency-service").exists());
}

#[test]
fn postgresql_without_database_is_rejected() {
    let ws = setup();
    let mut args = base_args(&ws);
    args.addons = vec!["postgresql".to_string()];

    let err = cmd_new(args).unwrap_err();

    assert!(matches!(err, SprigError::Validation(_)));
    assert!(err.to_string().contains("--database"));
}

#[test]
fn refuses_existing_target_directory() {
    let ws = setup();
    std::fs::create_dir(ws.dir.path().join("currency-service")).unwrap();
    let args = base_args(&ws);

    let err = cmd_new(args).unwrap_err();

    assert!(matches!(err, SprigError::User(_)));
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn missing_template_configuration_is_a_user_error() {
    let ws = setup();
    std::fs::write(&ws.config_path, "java_version: \"21\"\n").unwrap();
    let args = base_args(&ws);

    let err = cmd_new(args).unwrap_err();

    assert!(matches!(err, SprigError::User(_)));
    assert!(err.to_string().contains("--template"));
}

#[test]
fn composition_failure_removes_the_unversioned_tree() {
    // A template whose build descriptor lost its anchors: the postgresql
    // merge cannot find its insertion point.
    let template = create_template_dir();
    std::fs::write(
        template.path().join("build.gradle"),
        "dependencies {\n    implementation libs.commons.core\n}\n",
    )
    .unwrap();
    make_repo(template.path());
    let ws = setup_with_template(template);

    let mut args = base_args(&ws);
    args.addons = vec!["postgresql".to_string()];
    args.database = Some("currency_db".to_string());

    let err = cmd_new(args).unwrap_err();

    assert!(matches!(err, SprigError::Composition(_)));
    assert!(err.to_string().contains("insertion point"));
    // No git history had been initialized, so the partial tree is gone.
    assert!(!ws.dir.path().join("currency-service").exists());
    // And the port was never registered.
    assert!(!ws.registry_path().exists());
}

#[test]
fn unknown_addon_fails_validation() {
    let ws = setup();
    let mut args = base_args(&ws);
    args.addons = vec!["mongodb".to_string()];

    let err = cmd_new(args).unwrap_err();
    assert!(matches!(err, SprigError::Validation(_)));
}

#[test]
fn cli_overrides_take_precedence_over_config_defaults() {
    let ws = setup();
    let mut args = base_args(&ws);
    args.java_version = Some("17".to_string());

    cmd_new(args).unwrap();

    let build = std::fs::read_to_string(
        ws.dir.path().join("currency-service").join("build.gradle"),
    )
    .unwrap();
    assert!(build.contains("JavaLanguageVersion.of(17)"));
}

#[test]
#[serial]
fn default_parent_directory_is_the_current_directory() {
    let ws = setup();
    let _guard = DirGuard::new(ws.dir.path());

    let mut args = base_args(&ws);
    args.dir = None;
    // The config path is relative to the new cwd now.
    args.config = PathBuf::from("sprig.yaml");

    cmd_new(args).unwrap();

    assert!(ws.dir.path().join("currency-service").is_dir());
}
