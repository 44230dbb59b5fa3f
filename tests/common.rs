//! Common test utilities: exported-template fixtures and tree helpers.
use serde_json::{Value, json};

/// A template with a single resource and an empty parameter section.
#[allow(dead_code)]
pub fn template_with(resource: Value) -> String {
    json!({
        "$schema": "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#",
        "contentVersion": "1.0.0.0",
        "parameters": {},
        "variables": {},
        "resources": [resource]
    })
    .to_string()
}

/// A minimal exported service bus namespace.
#[allow(dead_code)]
pub fn namespace_resource(name: &str) -> Value {
    json!({
        "type": "Microsoft.ServiceBus/namespaces",
        "apiVersion": "2017-04-01",
        "name": name,
        "location": "West Europe",
        "sku": { "name": "Standard", "tier": "Standard" },
        "properties": {
            "provisioningState": "Succeeded",
            "serviceBusEndpoint": "https://foo.servicebus.windows.net:443/",
            "metricId": "0000-1111:foo",
            "status": "Active"
        }
    })
}

/// A minimal exported Logic App.
#[allow(dead_code)]
pub fn workflow_resource(name: &str, depends_on: Vec<&str>) -> Value {
    json!({
        "type": "Microsoft.Logic/workflows",
        "apiVersion": "2017-07-01",
        "name": name,
        "location": "westeurope",
        "dependsOn": depends_on,
        "properties": {
            "state": "Enabled",
            "definition": {
                "$schema": "https://schema.management.azure.com/providers/Microsoft.Logic/schemas/2016-06-01/workflowdefinition.json#",
                "triggers": {},
                "actions": {}
            },
            "parameters": {}
        }
    })
}

/// A realistic export: namespace, topic, a Logic App using SharePoint and Office 365,
/// and a storage account the normalizer does not know about. Carries comments and a
/// hard-coded password.
#[allow(dead_code)]
pub fn full_export_text() -> String {
    r#"{
  "$schema": "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#",
  "contentVersion": "1.0.0.0",
  // Exported from the test environment
  "parameters": {
    "namespaces_orderbus_name": { "defaultValue": "orderbus", "type": "String" },
    "workflows_orders_name": { "defaultValue": "orders", "type": "String" },
    "apiBaseUrl": { "defaultValue": "https://api.contoso.com", "type": "String" },
    "sharepointSite": { "defaultValue": "https://contoso.sharepoint.com/sites/Orders", "type": "String" }
  },
  "variables": {
    "quote": "'"
  },
  "resources": [
    {
      "type": "Microsoft.ServiceBus/namespaces",
      "apiVersion": "2017-04-01",
      "name": "[parameters('namespaces_orderbus_name')]",
      "location": "West Europe",
      "properties": {
        "serviceBusEndpoint": "https://orderbus.servicebus.windows.net:443/",
        "metricId": "0000-1111:orderbus"
      }
    },
    {
      "type": "Microsoft.ServiceBus/namespaces/topics",
      "apiVersion": "2017-04-01",
      "name": "[concat(parameters('namespaces_orderbus_name'), '/created')]",
      "location": "West Europe",
      "dependsOn": [
        "[resourceId('Microsoft.ServiceBus/namespaces', parameters('namespaces_orderbus_name'))]"
      ],
      "properties": { "maxSizeInMegabytes": 1024 }
    },
    /* the Logic App under test */
    {
      "type": "Microsoft.Logic/workflows",
      "apiVersion": "2017-07-01",
      "name": "[parameters('workflows_orders_name')]",
      "location": "westeurope",
      "dependsOn": [
        "[resourceId('Microsoft.Web/sites', parameters('sites_DevBaasFunctions_name'))]",
        "[resourceId('Microsoft.Web/connections', parameters('connections_office365_name'))]",
        "[resourceId('Microsoft.Web/connections', parameters('connections_sharepointonline_name'))]"
      ],
      "properties": {
        "state": "Enabled",
        "definition": {
          "triggers": {
            "Recurrence": {
              "recurrence": { "frequency": "Minute", "interval": 3 },
              "type": "Recurrence"
            }
          },
          "actions": {
            "Call_API": {
              "inputs": {
                "method": "POST",
                "uri": "https://api.contoso.com/orders",
                "authentication": {
                  "type": "Basic",
                  "username": "baas.stage.api",
                  "password": "B@ss4T%st"
                }
              },
              "metadata": { "apiDefinitionUrl": "https://api.contoso.com/swagger/docs/v1" },
              "type": "Http"
            },
            "Get_items": {
              "inputs": {
                "host": { "connection": { "name": "@parameters('$connections')['sharepointonline']['connectionId']" } },
                "method": "get",
                "path": "/datasets/@{encodeURIComponent(encodeURIComponent('https://contoso.sharepoint.com/sites/Orders'))}/tables/@{encodeURIComponent(encodeURIComponent('Orders'))}/items"
              },
              "type": "ApiConnection"
            }
          }
        },
        "parameters": {
          "$connections": {
            "value": {
              "office365": {
                "connectionId": "[resourceId('Microsoft.Web/connections', parameters('connections_office365_name'))]",
                "connectionName": "office365",
                "id": "/subscriptions/0000-1111/providers/Microsoft.Web/locations/westeurope/managedApis/office365"
              },
              "sharepointonline": {
                "connectionId": "[resourceId('Microsoft.Web/connections', parameters('connections_sharepointonline_name'))]",
                "connectionName": "sharepointonline",
                "id": "/subscriptions/0000-1111/providers/Microsoft.Web/locations/westeurope/managedApis/sharepointonline"
              }
            }
          }
        }
      }
    },
    {
      "type": "Microsoft.Storage/storageAccounts",
      "apiVersion": "2019-06-01",
      "name": "[parameters('storageAccounts_orders_name')]",
      "location": "westeurope",
      "kind": "StorageV2",
      "properties": { "supportsHttpsTrafficOnly": true }
    }
  ]
}"#
    .to_string()
}

/// Parses normalized output back into a tree for assertions.
#[allow(dead_code)]
pub fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("normalized output must be valid JSON")
}

/// The resource of the given type in a normalized tree.
#[allow(dead_code)]
pub fn resource_of_type<'a>(root: &'a Value, resource_type: &str) -> &'a Value {
    root["resources"]
        .as_array()
        .and_then(|resources| resources.iter().find(|r| r["type"] == resource_type))
        .unwrap_or_else(|| panic!("no resource of type {}", resource_type))
}
