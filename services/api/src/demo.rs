use crate::infra::Services;
use clap::Args;
use serde::Serialize;
use serde_json::json;
use shine::access::{Account, AccountDirectory, Caller};
use shine::blog::{CategoryCount, PostInput, PostListView};
use shine::error::AppError;
use shine::leads::{BookingStatistics, BookingSubmission};
use std::sync::Arc;

const DEMO_TOKEN: &str = "demo-token";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print compact JSON instead of the indented form.
    #[arg(long)]
    pub(crate) compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeedSummary {
    pub(crate) posts: usize,
    pub(crate) bookings: usize,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    categories: Vec<CategoryCount>,
    popular: Vec<PostListView>,
    statistics: BookingStatistics,
}

struct SamplePost {
    title: &'static str,
    category: &'static str,
    tags: &'static str,
    published: bool,
    featured: bool,
    reads: usize,
}

const SAMPLE_POSTS: [SamplePost; 5] = [
    SamplePost {
        title: "Ten Minute Kitchen Reset",
        category: "Cleaning Tips",
        tags: "kitchen, routine",
        published: true,
        featured: true,
        reads: 4,
    },
    SamplePost {
        title: "Vinegar, Bicarb and Lemon",
        category: "Eco Living",
        tags: "eco, diy",
        published: true,
        featured: false,
        reads: 7,
    },
    SamplePost {
        title: "End of Lease Checklist",
        category: "Guides",
        tags: "lease, checklist",
        published: true,
        featured: true,
        reads: 2,
    },
    SamplePost {
        title: "Keeping Grout White",
        category: "Cleaning Tips",
        tags: "bathroom",
        published: true,
        featured: false,
        reads: 1,
    },
    SamplePost {
        title: "Winter Deep Clean Plan",
        category: "Guides",
        tags: "seasonal",
        published: false,
        featured: false,
        reads: 0,
    },
];

const SAMPLE_LEADS: [(&str, &str, &str, &str); 4] = [
    ("general", "weekly", "Olivia", "Fitzroy"),
    ("deep", "once", "Noah", "Brunswick"),
    ("endOfLease", "once", "Priya", "Carlton"),
    ("moveIn", "monthly", "Liam", "Richmond"),
];

fn post_input(sample: &SamplePost) -> PostInput {
    let status = if sample.published { "published" } else { "draft" };
    PostInput {
        title: Some(sample.title.to_string()),
        excerpt: Some(format!("{} from the Sustainable Shine team.", sample.title)),
        content: Some(format!(
            "{}. Practical, low-tox cleaning advice for busy households.",
            sample.title
        )),
        category: Some(sample.category.to_string()),
        tags: Some(sample.tags.to_string()),
        status: Some(status.to_string()),
        featured: Some(sample.featured),
        ..PostInput::default()
    }
}

fn lead(service_type: &str, frequency: &str, first_name: &str, suburb: &str) -> BookingSubmission {
    BookingSubmission {
        service_type: Some(json!(service_type)),
        frequency: Some(json!(frequency)),
        bedrooms: Some(json!(3)),
        bathrooms: Some(json!(2)),
        selected_add_ons: Some(json!({ "oven": true })),
        selected_date: Some(json!("2025-09-15")),
        first_name: Some(json!(first_name)),
        last_name: Some(json!("Sample")),
        email: Some(json!(format!("{}@example.com", first_name.to_lowercase()))),
        phone: Some(json!("0400 123 456")),
        street: Some(json!("1 Demo Street")),
        suburb: Some(json!(suburb)),
        postcode: Some(json!("3000")),
        price_details: Some(json!({ "base": 160, "total": 185 })),
        ..BookingSubmission::default()
    }
}

/// Fill both verticals with sample content. Published posts are read anonymously so
/// the popular view has something to rank.
pub(crate) fn seed_demo(services: &Services, caller: &Caller) -> Result<SeedSummary, AppError> {
    for sample in &SAMPLE_POSTS {
        let post = services.blog.create(caller, post_input(sample))?;
        for _ in 0..sample.reads {
            services.blog.retrieve(&Caller::Anonymous, &post.slug)?;
        }
    }

    for (service_type, frequency, first_name, suburb) in SAMPLE_LEADS {
        services
            .bookings
            .submit(lead(service_type, frequency, first_name, suburb))?;
    }

    Ok(SeedSummary {
        posts: SAMPLE_POSTS.len(),
        bookings: SAMPLE_LEADS.len(),
    })
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let account = Account::new("demo");
    let accounts = Arc::new(AccountDirectory::default().with_account(account.clone(), DEMO_TOKEN));
    let services = Services::in_memory(accounts);
    let caller = Caller::Authenticated(account);

    let report = build_report(&services, &caller)?;
    let rendered = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{rendered}");
    Ok(())
}

fn build_report(services: &Services, caller: &Caller) -> Result<DemoReport, AppError> {
    seed_demo(services, caller)?;
    let popular = services.blog.popular(&Caller::Anonymous)?;
    Ok(DemoReport {
        categories: services.blog.categories(&Caller::Anonymous)?,
        popular: popular.iter().map(PostListView::from).collect(),
        statistics: services.bookings.statistics(caller)?,
    })
}
