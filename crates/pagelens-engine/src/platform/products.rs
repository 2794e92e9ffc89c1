//! Product sub-detectors: narrow a platform to a specific product from the
//! URL alone.

use pagelens_protocols::PlatformType;

/// `(needle, label)`: first needle contained in the lowercased URL wins.
type ProductRules = &'static [(&'static str, &'static str)];

const GITHUB: ProductRules = &[
    ("gist.github.com", "GitHub Gist"),
    ("/pull/", "GitHub Pull Requests"),
    ("/pulls", "GitHub Pull Requests"),
    ("/issues", "GitHub Issues"),
    ("/actions", "GitHub Actions"),
    ("/discussions", "GitHub Discussions"),
    ("/wiki", "GitHub Wiki"),
    ("/settings", "GitHub Settings"),
    ("/blob/", "GitHub Code"),
    ("/tree/", "GitHub Code"),
];

const AWS: ProductRules = &[
    ("/ec2/", "Amazon EC2"),
    ("/s3/", "Amazon S3"),
    ("/lambda/", "AWS Lambda"),
    ("/iam/", "AWS IAM"),
    ("/iamv2/", "AWS IAM"),
    ("/cloudwatch/", "Amazon CloudWatch"),
    ("/rds/", "Amazon RDS"),
    ("/ecs/", "Amazon ECS"),
    ("/eks/", "Amazon EKS"),
    ("/dynamodbv2/", "Amazon DynamoDB"),
    ("/cloudformation/", "AWS CloudFormation"),
    ("/vpc/", "Amazon VPC"),
    ("/route53/", "Amazon Route 53"),
    ("/sqs/", "Amazon SQS"),
    ("/sns/", "Amazon SNS"),
    ("/billing/", "AWS Billing"),
];

const GCP: ProductRules = &[
    ("/compute", "Compute Engine"),
    ("/kubernetes", "Google Kubernetes Engine"),
    ("/run", "Cloud Run"),
    ("/functions", "Cloud Functions"),
    ("/storage", "Cloud Storage"),
    ("/bigquery", "BigQuery"),
    ("/sql", "Cloud SQL"),
    ("/iam-admin", "Cloud IAM"),
    ("/logs", "Cloud Logging"),
    ("/monitoring", "Cloud Monitoring"),
    ("/cloudpubsub", "Pub/Sub"),
    ("/billing", "Cloud Billing"),
];

const AZURE: ProductRules = &[
    ("microsoft.compute/virtualmachines", "Azure Virtual Machines"),
    ("microsoft.web/sites", "Azure App Service"),
    ("microsoft.storage", "Azure Storage"),
    ("microsoft.sql", "Azure SQL"),
    ("microsoft.containerservice", "Azure Kubernetes Service"),
    ("microsoft.keyvault", "Azure Key Vault"),
    ("microsoft.insights", "Azure Monitor"),
    ("microsoft_aad", "Microsoft Entra ID"),
];

const GOOGLE_WORKSPACE: ProductRules = &[
    ("docs.google.com/document", "Google Docs"),
    ("docs.google.com/spreadsheets", "Google Sheets"),
    ("docs.google.com/presentation", "Google Slides"),
    ("docs.google.com/forms", "Google Forms"),
    ("mail.google.com", "Gmail"),
    ("drive.google.com", "Google Drive"),
    ("calendar.google.com", "Google Calendar"),
    ("meet.google.com", "Google Meet"),
];

const JIRA: ProductRules = &[
    ("/jira/servicedesk", "Jira Service Management"),
    ("/servicedesk/", "Jira Service Management"),
    ("/jira/software", "Jira Software"),
    ("/boards/", "Jira Board"),
    ("/secure/rapidboard", "Jira Board"),
    ("/browse/", "Jira Issue"),
];

const CONFLUENCE: ProductRules = &[
    ("/pages/", "Confluence Page"),
    ("/blog/", "Confluence Blog"),
    ("/spaces/", "Confluence Space"),
    ("/display/", "Confluence Space"),
];

/// Product label for `platform`, or `None` when it has no sub-detector.
///
/// `url` is host, path and fragment; matching is case-insensitive.
pub fn detect_product(platform: PlatformType, url: &str) -> Option<String> {
    let (rules, default) = match platform {
        PlatformType::Github => (GITHUB, "GitHub"),
        PlatformType::AwsConsole => (AWS, "AWS Console"),
        PlatformType::GcpConsole => (GCP, "Google Cloud Console"),
        PlatformType::AzurePortal => (AZURE, "Azure Portal"),
        PlatformType::GoogleWorkspace => (GOOGLE_WORKSPACE, "Google Workspace"),
        PlatformType::Jira => (JIRA, "Jira"),
        PlatformType::Confluence => (CONFLUENCE, "Confluence"),
        PlatformType::Gitlab
        | PlatformType::Vercel
        | PlatformType::Netlify
        | PlatformType::StackOverflow
        | PlatformType::Slack
        | PlatformType::Notion
        | PlatformType::Salesforce
        | PlatformType::Linear
        | PlatformType::Generic => return None,
    };
    let url = url.to_ascii_lowercase();
    let label = rules
        .iter()
        .find(|(needle, _)| url.contains(needle))
        .map_or(default, |(_, label)| label);
    Some(label.to_string())
}
