use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::entities::project::ProjectRecord;

struct SeedProject {
    id: i64,
    name: &'static str,
    short_description: &'static str,
    long_description: &'static str,
    readme_content: &'static str,
    technologies: &'static [&'static str],
    github_url: &'static str,
    thumbnail_url: &'static str,
    category: &'static str,
    is_featured: bool,
    created_on: (i32, u32, u32),
}

const SEED: &[SeedProject] = &[
    SeedProject {
        id: 1,
        name: "WellnessConnect",
        short_description: "A comprehensive wellness platform connecting users with healthcare providers and wellness services.",
        long_description: "WellnessConnect is a full-stack web application that bridges the gap between patients and healthcare providers. Features include appointment scheduling, telemedicine integration, health tracking, and personalized wellness recommendations.",
        readme_content: "# WellnessConnect\n\nA comprehensive wellness platform...",
        technologies: &["React", "Node.js", "Express", "MongoDB", "Socket.io", "JWT", "Stripe"],
        github_url: "https://github.com/Kvng-HackSOC/WellnessConnect",
        thumbnail_url: "https://images.unsplash.com/photo-1532938911079-1b06ac7ceec7?w=600&auto=format&fit=crop&q=60",
        category: "Healthcare",
        is_featured: true,
        created_on: (2024, 1, 15),
    },
    SeedProject {
        id: 2,
        name: "MediaFinder",
        short_description: "A powerful media discovery and management platform for content creators and consumers.",
        long_description: "MediaFinder is an intelligent media platform that helps users discover, organize, and manage digital content. Features include advanced search algorithms, content categorization, media analytics, and social sharing capabilities.",
        readme_content: "# MediaFinder\n\nA powerful media discovery platform...",
        technologies: &["Python", "Django", "PostgreSQL", "Redis", "Elasticsearch", "Docker", "AWS"],
        github_url: "https://github.com/Kvng-HackSOC/MediaFinder",
        thumbnail_url: "https://images.unsplash.com/photo-1559526324-c1f275fbfa32?w=600&auto=format&fit=crop&q=60",
        category: "Media & Entertainment",
        is_featured: true,
        created_on: (2024, 2, 1),
    },
    SeedProject {
        id: 3,
        name: "Distributed Log File Analyzer",
        short_description: "A high-performance distributed system for analyzing large-scale log files across multiple servers.",
        long_description: "This distributed log analyzer processes massive log files across multiple servers using MapReduce patterns. Features real-time analysis, anomaly detection, performance monitoring, and automated alerting systems.",
        readme_content: "# Distributed Log File Analyzer\n\nA high-performance distributed log analysis system...",
        technologies: &["Go", "Kafka", "Elasticsearch", "Kubernetes", "Prometheus", "Grafana", "Docker"],
        github_url: "https://github.com/Kvng-HackSOC/Distributed-Log-File-Analyzer",
        thumbnail_url: "https://images.unsplash.com/photo-1558494949-ef010cbdcc31?w=400&h=300&fit=crop&crop=center",
        category: "DevOps & Infrastructure",
        is_featured: true,
        created_on: (2024, 2, 15),
    },
    SeedProject {
        id: 4,
        name: "Sakila DVD Rental API",
        short_description: "A RESTful API for the classic Sakila DVD rental database with modern features and security.",
        long_description: "A comprehensive REST API built on the MySQL Sakila sample database. Includes advanced querying, authentication, rate limiting, caching, and comprehensive documentation. Perfect for learning API development and database design.",
        readme_content: "# Sakila DVD Rental API\n\nA RESTful API for DVD rental management...",
        technologies: &["Node.js", "Express", "MySQL", "JWT", "Redis", "Swagger", "Jest"],
        github_url: "https://github.com/Kvng-HackSOC/Sakila-DVD-Rental-API",
        thumbnail_url: "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=400&h=300&fit=crop&crop=center",
        category: "Backend Development",
        is_featured: false,
        created_on: (2024, 3, 1),
    },
];

/// The compiled-in default catalog, served only when neither the local
/// store nor the remote catalog has any records.
pub fn seed_projects() -> Vec<ProjectRecord> {
    SEED.iter().map(SeedProject::to_record).collect()
}

impl SeedProject {
    fn to_record(&self) -> ProjectRecord {
        let (year, month, day) = self.created_on;
        let at = midnight_utc(year, month, day);

        ProjectRecord {
            id: self.id,
            name: self.name.to_string(),
            short_description: self.short_description.to_string(),
            long_description: self.long_description.to_string(),
            readme_content: self.readme_content.to_string(),
            technologies: self.technologies.iter().map(|t| t.to_string()).collect(),
            github_url: Some(self.github_url.to_string()),
            live_url: None,
            video_url: None,
            thumbnail_url: Some(self.thumbnail_url.to_string()),
            category: self.category.to_string(),
            is_featured: self.is_featured,
            created_at: at,
            updated_at: at,
        }
    }
}

fn midnight_utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
