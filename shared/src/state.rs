use aws_config::BehaviorVersion;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;

/// AWS clients shared across a Lambda invocation. Built once at cold
/// start and handed around behind an Arc.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub s3_client: S3Client,
    pub cognito_client: CognitoClient,
    pub ses_client: SesClient,
}

impl AppState {
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        AppState {
            dynamo_client: DynamoClient::new(&config),
            s3_client: S3Client::new(&config),
            cognito_client: CognitoClient::new(&config),
            ses_client: SesClient::new(&config),
        }
    }
}
