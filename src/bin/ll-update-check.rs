use clap::{Parser, ValueEnum};
use linglong_store::updater::UpdateChecker;
use linglong_store::Config;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    /// 完整检查并输出报告
    Check,
    /// 仅提取已安装应用列表
    List,
    /// 仅输出需要更新的应用 ID
    Ids,
}

#[derive(Parser)]
#[command(name = "ll-update-check")]
#[command(about = "玲珑应用更新检查工具", long_about = None)]
struct Args {
    /// 临时文件目录（默认: /tmp）
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// 架构（默认: x86_64）
    #[arg(long)]
    arch: Option<String>,

    /// 执行的操作
    #[arg(long, value_enum, default_value = "check")]
    action: Action,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = match Config::load_or_default() {
        Ok(config) => config.with_overrides(args.arch, None, None),
        Err(e) => {
            eprintln!("错误: {}", e);
            process::exit(1);
        }
    };
    if let Some(temp_dir) = args.temp_dir {
        config.temp_dir = temp_dir;
    }

    let checker = UpdateChecker::new(&config).print_report(matches!(args.action, Action::Check));

    let ok = match args.action {
        Action::Check => match checker.run_full_check().await {
            Some(summary) => {
                println!("\n检查完成！发现 {} 个可更新的应用。", summary.updateable_count);
                true
            }
            None => false,
        },
        Action::List => match checker.installed_apps() {
            Ok(apps) => {
                for app in &apps {
                    println!("{} - {}", app.app_id, app.version);
                }
                true
            }
            Err(e) => {
                eprintln!("错误: {}", e);
                false
            }
        },
        Action::Ids => match checker.run_full_check().await {
            Some(summary) => {
                for id in summary.updateable_ids() {
                    println!("{}", id);
                }
                true
            }
            None => false,
        },
    };

    process::exit(if ok { 0 } else { 1 });
}
