//! Status classification
//!
//! A non-2xx response becomes [`Error::Service`], unless its body carries
//! the authorization-denied marker for the target's invoke action, in which
//! case it becomes a structured [`Error::PermissionDenied`].

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use super::HttpResponse;
use crate::error::{Error, PermissionDenied, Remediation, Result};
use crate::target::{InvocationTarget, TargetKind};

static DENIAL_DETAILS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"User: (?P<principal>[^\s"]+) is not authorized to perform: [^\s"]+(?: on resource: (?P<resource>[^\s"]+))?"#,
    )
    .expect("denial pattern is valid")
});

/// Substring that identifies an authorization denial for `action`.
pub fn permission_denied_marker(action: &str) -> String {
    format!("not authorized to perform: {action}")
}

/// Pass 2xx responses through; turn anything else into an error.
///
/// # Errors
///
/// - [`Error::PermissionDenied`] when the body names the target's invoke action
/// - [`Error::Service`] with the raw body otherwise
pub fn check_status(target: &InvocationTarget, response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text();
    let action = target.invoke_action();

    if body.contains(&permission_denied_marker(action)) {
        let denied = permission_denied(target, status, body);
        warn!(
            status,
            action = %denied.action,
            principal = denied.principal.as_deref(),
            resource = denied.resource.as_deref(),
            "Invocation denied"
        );
        return Err(denied.into());
    }

    Err(Error::Service {
        status,
        message: body,
    })
}

fn permission_denied(target: &InvocationTarget, status: u16, body: String) -> PermissionDenied {
    let action = target.invoke_action().to_string();
    let (principal, resource) = match DENIAL_DETAILS.captures(&body) {
        Some(caps) => (
            caps.name("principal").map(|m| m.as_str().to_string()),
            caps.name("resource").map(|m| m.as_str().to_string()),
        ),
        None => (None, None),
    };

    let mut remediation = vec![Remediation::GrantIdentityPolicy {
        action: action.clone(),
        principal: principal.clone(),
    }];
    match target.kind {
        TargetKind::Proxy => remediation.push(Remediation::CheckResourcePolicy {
            resource: resource.clone(),
        }),
        TargetKind::DirectModel => {
            if let Some(model_id) = &target.model_id {
                remediation.push(Remediation::EnableModelAccess {
                    model_id: model_id.clone(),
                });
            }
        }
    }

    PermissionDenied {
        status,
        action,
        principal,
        resource,
        remediation,
        raw_body: body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::AwsRegion;
    use http::{HeaderMap, StatusCode};
    use pretty_assertions::assert_eq;

    const MODEL: &str = "amazon.nova-canvas-v1:0";

    fn direct() -> InvocationTarget {
        InvocationTarget::direct_model_for_region(AwsRegion::UsEast1, MODEL).unwrap()
    }

    fn proxy() -> InvocationTarget {
        InvocationTarget::proxy(
            "https://abc123.execute-api.ap-northeast-1.amazonaws.com",
            "/dev/generateImage",
            AwsRegion::ApNortheast1,
        )
        .unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.to_string(),
        )
    }

    #[test]
    fn test_success_passes_through() {
        let ok = check_status(&direct(), response(200, "{}")).unwrap();
        assert_eq!(ok.text(), "{}");
    }

    #[test]
    fn test_plain_service_error() {
        let err = check_status(&direct(), response(500, "Internal failure")).unwrap_err();
        match err {
            Error::Service { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal failure");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn test_direct_model_permission_denied() {
        let body = r#"{"message":"User: arn:aws:sts::123456789012:assumed-role/Cognito_Unauth_Role/CognitoIdentityCredentials is not authorized to perform: bedrock:InvokeModel on resource: arn:aws:bedrock:us-east-1::foundation-model/amazon.nova-canvas-v1:0 because no identity-based policy allows the bedrock:InvokeModel action"}"#;
        let err = check_status(&direct(), response(403, body)).unwrap_err();
        let denied = err.permission_denied().expect("permission denied");

        assert_eq!(denied.status, 403);
        assert_eq!(denied.action, "bedrock:InvokeModel");
        assert_eq!(
            denied.principal.as_deref(),
            Some(
                "arn:aws:sts::123456789012:assumed-role/Cognito_Unauth_Role/CognitoIdentityCredentials"
            )
        );
        assert_eq!(
            denied.resource.as_deref(),
            Some("arn:aws:bedrock:us-east-1::foundation-model/amazon.nova-canvas-v1:0")
        );
        assert_eq!(
            denied.remediation.last(),
            Some(&Remediation::EnableModelAccess {
                model_id: MODEL.to_string()
            })
        );
        assert_eq!(denied.raw_body, body);
    }

    #[test]
    fn test_proxy_permission_denied_without_resource() {
        let body = r#"{"Message":"User: anonymous is not authorized to perform: execute-api:Invoke"}"#;
        let err = check_status(&proxy(), response(403, body)).unwrap_err();
        let denied = err.permission_denied().expect("permission denied");

        assert_eq!(denied.action, "execute-api:Invoke");
        assert_eq!(denied.principal.as_deref(), Some("anonymous"));
        assert!(denied.resource.is_none());
        assert_eq!(
            denied.remediation,
            vec![
                Remediation::GrantIdentityPolicy {
                    action: "execute-api:Invoke".to_string(),
                    principal: Some("anonymous".to_string()),
                },
                Remediation::CheckResourcePolicy { resource: None },
            ]
        );
    }

    #[test]
    fn test_marker_for_other_action_is_generic_service_error() {
        let body = "User: x is not authorized to perform: bedrock:InvokeModel";
        let err = check_status(&proxy(), response(403, body)).unwrap_err();
        assert!(matches!(err, Error::Service { status: 403, .. }));
    }

    #[test]
    fn test_403_without_marker_is_service_error() {
        let err = check_status(&direct(), response(403, r#"{"message":"Forbidden"}"#)).unwrap_err();
        assert!(matches!(err, Error::Service { status: 403, .. }));
    }
}
