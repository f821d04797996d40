use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not
        // thread-safe. Lock it so tests don't race even if a #[serial]
        // annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Build a minimal but complete service template on disk: dependency
/// catalog, build descriptor with both anchors, runtime configuration,
/// placeholder-named entry point with the default persistence exclusion,
/// and an empty migrations directory.
pub(crate) fn create_template_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(
        root,
        "settings.gradle",
        "rootProject.name = '[[service-name]]'\n",
    );
    write(
        root,
        "build.gradle",
        "plugins {\n\
         \x20   id 'java'\n\
         }\n\
         \n\
         java {\n\
         \x20   toolchain {\n\
         \x20       languageVersion = JavaLanguageVersion.of([[java-version]])\n\
         \x20   }\n\
         }\n\
         \n\
         dependencyManagement {\n\
         \x20   // sprig:dependency-management\n\
         }\n\
         \n\
         dependencies {\n\
         \x20   implementation libs.commons.core\n\
         \x20   // sprig:dependencies\n\
         }\n",
    );
    write(
        root,
        "gradle/libs.versions.toml",
        "[versions]\n\
         commons = \"[[commons-version]]\"\n\
         \n\
         [libraries]\n\
         commons-core = { module = \"demo:commons-core\", version.ref = \"commons\" }\n",
    );
    write(
        root,
        "src/main/resources/application.yaml",
        "spring:\n\
         \x20 application:\n\
         \x20   name: [[service-name]]\n\
         server:\n\
         \x20 port: [[port]]\n",
    );
    write(
        root,
        "src/main/java/demo/[[domain]]/[[DomainClass]]Application.java",
        "package demo.[[domain]];\n\
         \n\
         import org.springframework.boot.SpringApplication;\n\
         import org.springframework.boot.autoconfigure.SpringBootApplication;\n\
         import org.springframework.boot.autoconfigure.jdbc.DataSourceAutoConfiguration;\n\
         \n\
         @SpringBootApplication(exclude = {DataSourceAutoConfiguration.class})\n\
         public class [[DomainClass]]Application {\n\
         \n\
         \x20   public static void main(String[] args) {\n\
         \x20       SpringApplication.run([[DomainClass]]Application.class, args);\n\
         \x20   }\n\
         }\n",
    );
    write(root, "README.md", "# [[service-name]]\n");
    std::fs::create_dir_all(root.join("src/main/resources/db/migration")).unwrap();

    temp_dir
}

/// Build a fragments directory covering the add-ons the tests exercise.
/// `web` has no directory on purpose: its catalog behavior is built in.
pub(crate) fn create_fragments_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(
        root,
        "postgresql/libs.versions.toml",
        "postgresql = { module = \"org.postgresql:postgresql\", version = \"42.7.4\" }\n",
    );
    write(root, "postgresql/build.gradle", "runtimeOnly libs.postgresql\n");
    write(
        root,
        "postgresql/application.yaml",
        "spring:\n\
         \x20 datasource:\n\
         \x20   url: jdbc:postgresql://localhost:5432/[[database]]\n\
         \x20   username: [[database]]\n",
    );
    write(
        root,
        "postgresql/migrations/V001__create_schema.sql",
        "create schema if not exists [[database]];\n",
    );
    write(
        root,
        "postgresql/unexclude.txt",
        "org.springframework.boot.autoconfigure.jdbc.DataSourceAutoConfiguration\n",
    );

    write(
        root,
        "rabbitmq/libs.versions.toml",
        "amqp = { module = \"org.springframework.boot:spring-boot-starter-amqp\" }\n",
    );
    write(root, "rabbitmq/build.gradle", "implementation libs.amqp\n");
    write(
        root,
        "rabbitmq/application.yaml",
        "spring:\n\
         \x20 rabbitmq:\n\
         \x20   host: localhost\n",
    );

    write(
        root,
        "redis/libs.versions.toml",
        "redis = { module = \"org.springframework.boot:spring-boot-starter-data-redis\" }\n",
    );
    write(root, "redis/build.gradle", "implementation libs.redis\n");

    write(
        root,
        "shedlock/libs.versions.toml",
        "shedlock = { module = \"net.javacrumbs.shedlock:shedlock-spring\", version = \"5.16.0\" }\n",
    );
    write(root, "shedlock/build.gradle", "implementation libs.shedlock\n");
    write(
        root,
        "shedlock/migrations/V900__shedlock.sql",
        "create table shedlock (name varchar(64) primary key);\n",
    );

    temp_dir
}

/// Turn a template directory into a git repository with one commit, so the
/// clone path of `sprig new` can be exercised against a local source.
pub(crate) fn create_template_repo() -> TempDir {
    let temp_dir = create_template_dir();
    make_repo(temp_dir.path());
    temp_dir
}

/// Initialize a repository with one commit over an existing directory.
pub(crate) fn make_repo(path: &Path) {
    git(path, &["init"]);
    // Deterministic default branch name across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Template"]);
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}
