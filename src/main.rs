use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use linglong_store::store::{AppDetail, AppSummary, Category, SearchFilters, StoreClient};
use linglong_store::Config;
use serde::Serialize;

const DESCRIPTION_WIDTH: usize = 80;

#[derive(Parser)]
#[command(name = "ll-store")]
#[command(about = "玲珑应用商店查询工具", long_about = None)]
struct Cli {
    /// 架构（默认取配置文件，否则 x86_64）
    #[arg(long, global = true)]
    arch: Option<String>,

    /// 语言（默认 zh）
    #[arg(long, global = true)]
    lang: Option<String>,

    /// 仓库名（默认 stable）
    #[arg(long, global = true)]
    repo_name: Option<String>,

    /// 以 JSON 格式输出
    #[arg(long, global = true)]
    json: bool,

    /// 输出接口原始响应
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page_no: u32,

    #[arg(long, default_value_t = 20)]
    page_size: u32,

    /// 最多显示条数，0 表示不限制
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[derive(Args)]
struct CategorySource {
    /// 使用 /web/categories 查找分类
    #[arg(long, conflicts_with = "use_app_categories")]
    use_web_categories: bool,

    /// 使用应用分类接口查找分类（默认）
    #[arg(long)]
    use_app_categories: bool,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    zh_name: Option<String>,

    #[arg(long)]
    module: Option<String>,

    #[arg(long)]
    version: Option<String>,

    #[arg(long)]
    sort: Option<String>,

    #[arg(long)]
    order: Option<String>,
}

impl FilterArgs {
    fn into_filters(self, name: Option<String>, category_id: Option<String>) -> SearchFilters {
        SearchFilters {
            name,
            zh_name: self.zh_name,
            category_id,
            module: self.module,
            version: self.version,
            sort: self.sort,
            order: self.order,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 列出商店分类
    Categories {
        /// 使用 /web/categories 接口
        #[arg(long)]
        web: bool,

        /// 最多显示条数，0 表示不限制
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },

    /// 列出分类下的应用
    CategoryApps {
        #[arg(long, required_unless_present = "category_name")]
        category_id: Option<String>,

        #[arg(long)]
        category_name: Option<String>,

        /// 同时显示分类应用总数
        #[arg(long)]
        show_count: bool,

        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        source: CategorySource,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// 按名称或分类搜索应用
    Search {
        /// 搜索关键词（应用名称）
        #[arg(required_unless_present_any = ["category_id", "category_name", "zh_name"])]
        keyword: Option<String>,

        #[arg(long)]
        category_id: Option<String>,

        #[arg(long)]
        category_name: Option<String>,

        #[command(flatten)]
        source: CategorySource,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// 获取应用详情
    Detail {
        app_id: String,

        /// 仅输出截图链接
        #[arg(long)]
        screenshots: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default()?.with_overrides(cli.arch, cli.lang, cli.repo_name);
    let client = StoreClient::new(&config);
    let json = cli.json;

    match cli.command {
        Commands::Categories { web, limit } => {
            if cli.raw {
                print_json(&client.get_categories_raw(web).await?)?;
                return Ok(());
            }
            let categories = truncate(client.get_categories(web).await?, limit);
            if json {
                print_json(&categories)?;
            } else {
                print_categories(&categories);
            }
        }

        Commands::CategoryApps {
            category_id,
            category_name,
            show_count,
            name,
            source,
            filters,
            page,
        } => {
            let category_id = client
                .resolve_category_id(
                    category_id.as_deref(),
                    category_name.as_deref(),
                    source.use_web_categories,
                )
                .await?
                .ok_or_else(|| anyhow::anyhow!("需要提供 --category-id 或 --category-name"))?;

            if show_count && cli.raw {
                print_json(&client.get_category_app_count_raw(&category_id).await?)?;
            } else if show_count {
                let count = client.get_category_app_count(&category_id).await?;
                if json {
                    print_json(&serde_json::json!({ "categoryId": category_id, "count": count }))?;
                } else {
                    println!("分类 {} 共有 {} 个应用\n", category_id, count);
                }
            }

            let filters = filters.into_filters(name, Some(category_id));
            let payload = client.build_search_payload(page.page_no, page.page_size, &filters);
            if cli.raw {
                print_json(&client.search_apps(&payload).await?)?;
            } else {
                let apps = truncate(client.search(&payload).await?, page.limit);
                print_apps(&apps, json)?;
            }
        }

        Commands::Search {
            keyword,
            category_id,
            category_name,
            source,
            filters,
            page,
        } => {
            let category_id = client
                .resolve_category_id(
                    category_id.as_deref(),
                    category_name.as_deref(),
                    source.use_web_categories,
                )
                .await?;

            let filters = filters.into_filters(keyword, category_id);
            let payload = client.build_search_payload(page.page_no, page.page_size, &filters);
            if cli.raw {
                print_json(&client.search_apps(&payload).await?)?;
            } else {
                let apps = truncate(client.search(&payload).await?, page.limit);
                print_apps(&apps, json)?;
            }
        }

        Commands::Detail {
            app_id,
            screenshots,
        } => {
            if cli.raw {
                print_json(&client.get_app_detail_raw(&app_id).await?)?;
                return Ok(());
            }
            let detail = client.get_app_detail(&app_id).await?;
            if json {
                print_json(&detail)?;
            } else if screenshots {
                print_screenshots(&detail);
            } else {
                print_detail(&detail);
            }
        }
    }

    Ok(())
}

fn truncate<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    if limit > 0 {
        items.truncate(limit);
    }
    items
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("未获取到分类");
        return;
    }
    println!("共 {} 个分类:\n", categories.len());
    for category in categories {
        println!("  {:<8} {} ({} 个应用)", category.id, category.name, category.count);
    }
}

fn print_apps(apps: &[AppSummary], json: bool) -> Result<()> {
    if json {
        return print_json(apps);
    }
    if apps.is_empty() {
        println!("未找到匹配的应用");
        return Ok(());
    }

    println!("共找到 {} 个应用:\n", apps.len());
    for (i, app) in apps.iter().enumerate() {
        println!("{}. {}", i + 1, show(&app.app_id));
        println!("   名称: {}", show(&app.name));
        println!("   版本: {}", show(&app.version));
        println!("   架构: {}", show(&app.arch));
        if let Some(icon) = app.icon.as_deref().filter(|s| !s.is_empty()) {
            println!("   图标: {}", icon);
        }
        if let Some(desc) = app.description.as_deref().filter(|s| !s.is_empty()) {
            println!("   描述: {}", shorten(desc, DESCRIPTION_WIDTH));
        }
        println!();
    }
    Ok(())
}

fn print_detail(detail: &AppDetail) {
    let app = &detail.summary;
    println!("应用ID: {}", show(&app.app_id));
    println!("名称: {}", show(&app.name));
    println!("版本: {}", show(&app.version));
    println!("架构: {}", show(&app.arch));
    println!("分类: {}", show(&detail.category));
    println!("开发者: {}", show(&detail.developer));
    println!("大小: {}", show(&detail.size));
    if let Some(icon) = app.icon.as_deref().filter(|s| !s.is_empty()) {
        println!("图标: {}", icon);
    }
    if let Some(desc) = app.description.as_deref().filter(|s| !s.is_empty()) {
        println!("描述: {}", desc);
    }
    if !detail.screenshots.is_empty() {
        println!("\n截图 ({} 张):", detail.screenshots.len());
        for (i, url) in detail.screenshots.iter().enumerate() {
            println!("  {}. {}", i + 1, url);
        }
    }
}

fn print_screenshots(detail: &AppDetail) {
    if detail.screenshots.is_empty() {
        println!("该应用暂无截图");
        return;
    }
    println!("{} 的截图:", show(&detail.summary.name));
    for (i, url) in detail.screenshots.iter().enumerate() {
        println!("  {}. {}", i + 1, url);
    }
}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn shorten(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
