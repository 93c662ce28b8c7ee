use std::sync::atomic::{AtomicUsize, Ordering};

use lwdic_core::prelude::*;

// ==================== 接口定义 ====================

pub trait UserRepository: Send + Sync {
    fn find(&self, id: u32) -> Option<String>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, user: &str, message: &str) -> String;
}

/// 所有服务的公共父类型，不会被实例化
pub trait Service: Send + Sync {
    fn service_name(&self) -> &'static str;
}

abstract_bean!(dyn Service);

// ==================== 基础设施 ====================

#[derive(Bean, Default)]
#[implements(UserRepository)]
struct InMemoryUserRepository;

impl UserRepository for InMemoryUserRepository {
    fn find(&self, id: u32) -> Option<String> {
        match id {
            1 => Some("alice".to_string()),
            2 => Some("bob".to_string()),
            _ => None,
        }
    }
}

#[derive(Bean, Default)]
#[named("emailNotifier")]
#[implements(Notifier)]
struct EmailNotifier {
    sent: AtomicUsize,
}

impl Notifier for EmailNotifier {
    fn notify(&self, user: &str, message: &str) -> String {
        let count = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        format!("[email #{}] to {}: {}", count, user, message)
    }
}

/// 同样实现了 Notifier，只能按名称查找
#[derive(Bean, Default)]
#[named("smsNotifier")]
#[implements(Notifier)]
struct SmsNotifier;

impl Notifier for SmsNotifier {
    fn notify(&self, user: &str, message: &str) -> String {
        format!("[sms] to {}: {}", user, message)
    }
}

/// 调试用的空实现，扫描时跳过
#[derive(Bean)]
#[bean(injectable = false)]
#[implements(UserRepository)]
#[allow(dead_code)]
struct NullUserRepository;

impl UserRepository for NullUserRepository {
    fn find(&self, _id: u32) -> Option<String> {
        None
    }
}

// ==================== 业务服务 ====================

#[derive(Bean, Default)]
#[extends(Service)]
struct UserService {
    #[inject]
    repository: Inject<dyn UserRepository>,

    #[inject]
    #[named("emailNotifier")]
    notifier: Inject<dyn Notifier>,

    #[named("greeting")]
    greeting: Inject<String>,
}

impl Service for UserService {
    fn service_name(&self) -> &'static str {
        "user-service"
    }
}

impl UserService {
    fn welcome(&self, id: u32) -> anyhow::Result<String> {
        let repository = self
            .repository
            .get()
            .ok_or_else(|| anyhow!("repository was not injected"))?;
        let notifier = self
            .notifier
            .get()
            .ok_or_else(|| anyhow!("notifier was not injected"))?;
        let greeting = self.greeting.get().map(String::as_str).unwrap_or("Hello");

        let user = repository
            .find(id)
            .with_context(|| format!("user {} does not exist", id))?;
        Ok(notifier.notify(&user, &format!("{}, {}!", greeting, user)))
    }
}

#[derive(Bean)]
#[bean(constructor = "try_new")]
#[extends(Service)]
struct ReportService {
    #[inject]
    #[named("smsNotifier")]
    notifier: Inject<dyn Notifier>,

    threshold: usize,
}

impl Service for ReportService {
    fn service_name(&self) -> &'static str {
        "report-service"
    }
}

impl ReportService {
    fn try_new() -> anyhow::Result<Self> {
        let threshold = std::env::var("DEMO_REPORT_THRESHOLD")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("DEMO_REPORT_THRESHOLD must be a number")?;
        Ok(Self {
            notifier: Inject::new(),
            threshold,
        })
    }

    fn send(&self, user: &str) -> anyhow::Result<String> {
        let notifier = self
            .notifier
            .get()
            .ok_or_else(|| anyhow!("notifier was not injected"))?;
        Ok(notifier.notify(user, &format!("{} items pending review", self.threshold)))
    }
}

fn main() -> anyhow::Result<()> {
    // 查找配置文件
    let config_file = ["demos/app-demo/lwdic.toml", "lwdic.toml"]
        .into_iter()
        .find(|path| std::path::Path::new(path).exists())
        .unwrap_or(lwdic_core::constants::DEFAULT_CONFIG_FILE);

    let container = Application::new("LwdicDemo")
        .config_file(config_file)
        .scan(module_path!())
        .initializer(|container| container.add_bean("greeting", "Welcome".to_string()))
        .run()?;

    tracing::info!("{:?}", container);

    let users = container.get_bean_by_type::<UserService>()?;
    tracing::info!("{}", users.welcome(1)?);
    tracing::info!("{}", users.welcome(2)?);
    if let Err(e) = users.welcome(7) {
        tracing::warn!("{:#}", e);
    }

    let reports = container.get_bean_by_type::<ReportService>()?;
    tracing::info!("{}", reports.send("alice")?);

    // 两个服务都以 Service 注册，按类型查找会产生歧义
    match container.get_bean_by_type::<dyn Service>() {
        Ok(service) => tracing::info!("Single service: {}", service.service_name()),
        Err(e) => tracing::warn!("{}", e),
    }
    let sms = container.get_bean_by_name_and_type::<dyn Notifier>("smsNotifier")?;
    tracing::info!("{}", sms.notify("bob", "lookup by name"));

    let mut keys: Vec<String> = container.get_beans().into_keys().collect();
    keys.sort();
    for key in keys {
        tracing::debug!("registered key: {}", key);
    }

    tracing::info!(
        "Done: {} bean(s) under {} key(s)",
        container.bean_count(),
        container.key_count()
    );
    Ok(())
}
